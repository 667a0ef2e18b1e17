//! Interactive interpreter over the catalog. Every view change passes
//! through the authorization gate before anything renders; list views share
//! one query-parameter set and the pure catalog engine.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::catalog::query::{self, AnioFilter, AutorFilter, QueryParams, SortMode};
use crate::catalog::{Autor, AutorForm, Libro, LibroForm};
use crate::client::{ApiClient, Navigator};
use crate::identity::{evaluate, resolve_post_login, AccessDecision, PendingRedirect, Route, SessionStore};
use crate::validation::{LoginForm, RegistroForm};

use super::outputformatter::{imprimir_autores, imprimir_libro, imprimir_libros};

/// Current-route cell shared with the client, so the expiry guard can force
/// the shell onto the login view from inside any call.
pub struct ShellNavigator {
    actual: Mutex<Route>,
}

impl ShellNavigator {
    pub fn new(inicio: Route) -> Self {
        Self { actual: Mutex::new(inicio) }
    }

    pub fn actual(&self) -> Route {
        self.actual.lock().clone()
    }
}

impl Navigator for ShellNavigator {
    fn goto(&self, route: Route) {
        tracing::info!("navegando a {}", route.path());
        *self.actual.lock() = route;
    }
}

struct Shell {
    client: ApiClient,
    store: Arc<SessionStore>,
    nav: Arc<ShellNavigator>,
    pending: PendingRedirect,
    params: QueryParams,
    libros: Vec<Libro>,
    autores: Vec<Autor>,
    cargado: bool,
}

pub async fn run_shell(client: ApiClient, store: Arc<SessionStore>, nav: Arc<ShellNavigator>) -> Result<()> {
    let mut shell = Shell {
        client,
        store,
        nav,
        pending: PendingRedirect::new(),
        params: QueryParams::default(),
        libros: Vec::new(),
        autores: Vec::new(),
        cargado: false,
    };

    println!("libroteca. Escribe 'ayuda' para ver los comandos.");
    shell.entrar(Route::Home).await;

    let mut rl = DefaultEditor::new()?;
    loop {
        let prompt = format!("libroteca:{}> ", shell.nav.actual().path());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);
                if matches!(line.as_str(), "salir" | "exit" | "quit") {
                    break;
                }
                shell.despachar(&mut rl, &line).await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("error de lectura: {}", e);
                break;
            }
        }
    }
    Ok(())
}

impl Shell {
    /// Gate-checked navigation. Guarded views only render after Granted;
    /// a denied attempt records the target for after login.
    async fn entrar(&mut self, destino: Route) {
        match evaluate(&destino, &self.store) {
            AccessDecision::Granted => {
                self.nav.goto(destino.clone());
                if let Err(e) = self.render(&destino).await {
                    eprintln!("Error: {}", e);
                }
            }
            AccessDecision::DeniedUnauthenticated => {
                self.pending.set(destino.path());
                println!("Necesitas iniciar sesión para entrar a {}", destino.path());
                self.nav.goto(Route::Login);
                let _ = self.render(&Route::Login).await;
            }
            AccessDecision::DeniedForbidden => {
                println!("No estás autorizado para ver {}", destino.path());
                self.nav.goto(Route::Home);
            }
        }
    }

    async fn render(&mut self, route: &Route) -> Result<()> {
        match route {
            Route::Home => {
                println!("Bienvenido a la biblioteca.");
                match self.store.current() {
                    Some(id) => println!("Sesión de {} iniciada.", id.username),
                    None => println!("Navegación pública; usa 'login <usuario>' para iniciar sesión."),
                }
                println!("Usa 'ir /biblioteca' para explorar el catálogo.");
            }
            Route::Biblioteca | Route::AdminLibros => {
                self.recargar().await?;
                self.mostrar_lista();
                if matches!(route, Route::AdminLibros) {
                    println!("comandos admin: nuevo-libro, editar-libro, borrar-libro");
                }
            }
            Route::LibroDetalle(id) => {
                let libro = self.client.obtener_libro(*id).await?;
                let url = self.client.url_portada(libro.portada.as_deref());
                imprimir_libro(&libro, &url);
            }
            Route::Admin => {
                self.recargar().await?;
                println!(
                    "Panel de administración: {} libro(s), {} autor(es).",
                    self.libros.len(),
                    self.autores.len()
                );
                println!("Vistas: ir /admin/libros, ir /admin/autores");
            }
            Route::AdminAutores => {
                self.autores = self.client.listar_autores().await?;
                imprimir_autores(&self.autores);
                println!("comandos admin: nuevo-autor, editar-autor, borrar-autor");
            }
            Route::Login => {
                println!("Inicia sesión con: login <usuario>  (o 'registro <usuario> <email>')");
            }
            Route::Registro => {
                println!("Regístrate con: registro <usuario> <email>");
            }
        }
        Ok(())
    }

    /// Fetch books and authors concurrently; both must settle or the load
    /// fails as a whole.
    async fn recargar(&mut self) -> Result<()> {
        let (libros, autores) = tokio::try_join!(self.client.listar_libros(), self.client.listar_autores())?;
        self.libros = libros;
        self.autores = autores;
        self.cargado = true;
        Ok(())
    }

    fn mostrar_lista(&self) {
        let outcome = query::apply(&self.libros, &self.params);
        imprimir_libros(&outcome, self.params.pagina);
        if self.params.tiene_filtros() {
            println!("(filtros activos; usa 'limpiar' para quitarlos)");
        }
        if !outcome.anios_disponibles.is_empty() {
            let anios: Vec<String> = outcome.anios_disponibles.iter().map(|a| a.to_string()).collect();
            println!("años disponibles: {}", anios.join(", "));
        }
    }

    /// A filter or sort field changed: clamp the page into range before
    /// showing the list. Bare page navigation does not come through here.
    fn filtros_cambiados(&mut self) {
        let outcome = query::apply(&self.libros, &self.params);
        query::clamp_pagina(&mut self.params, outcome.total_paginas);
        self.mostrar_lista();
    }

    fn en_vista_de_lista(&self) -> bool {
        matches!(self.nav.actual(), Route::Biblioteca | Route::AdminLibros) && self.cargado
    }

    async fn despachar(&mut self, rl: &mut DefaultEditor, line: &str) {
        let (cmd, resto) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };
        match cmd {
            "ayuda" | "help" => imprimir_ayuda(),
            "ir" => match Route::parse(resto) {
                Some(r) => self.entrar(r).await,
                None => eprintln!("ruta desconocida: {}", resto),
            },
            "recargar" => {
                if let Err(e) = self.recargar().await {
                    eprintln!("Error: {}", e);
                } else if self.en_vista_de_lista() {
                    self.mostrar_lista();
                }
            }
            "buscar" => {
                self.params.busqueda = resto.to_string();
                self.si_lista_filtros_cambiados();
            }
            "autor" => {
                match resto {
                    "todos" | "" => self.params.autor = AutorFilter::Todos,
                    id => match id.parse::<i64>() {
                        Ok(n) => self.params.autor = AutorFilter::Autor(n),
                        Err(_) => {
                            eprintln!("uso: autor <id|todos>");
                            return;
                        }
                    },
                }
                self.si_lista_filtros_cambiados();
            }
            "anio" => {
                match resto {
                    "todos" | "" => self.params.anio = AnioFilter::Todos,
                    a => match a.parse::<i32>() {
                        Ok(n) => self.params.anio = AnioFilter::Anio(n),
                        Err(_) => {
                            eprintln!("uso: anio <año|todos>");
                            return;
                        }
                    },
                }
                self.si_lista_filtros_cambiados();
            }
            "orden" => {
                match resto {
                    "recientes" => self.params.orden = SortMode::Recientes,
                    "titulo" => self.params.orden = SortMode::TituloAsc,
                    "anio" => self.params.orden = SortMode::AnioDesc,
                    _ => {
                        eprintln!("uso: orden <recientes|titulo|anio>");
                        return;
                    }
                }
                self.si_lista_filtros_cambiados();
            }
            "pagina" => match resto.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    self.params.pagina = n;
                    if self.en_vista_de_lista() {
                        self.mostrar_lista();
                    }
                }
                _ => eprintln!("uso: pagina <n>"),
            },
            "limpiar" => {
                self.params = QueryParams { por_pagina: self.params.por_pagina, ..QueryParams::default() };
                self.si_lista_filtros_cambiados();
            }
            "login" => self.login(rl, resto).await,
            "registro" => self.registro(rl, resto).await,
            "logout" => {
                self.client.cerrar_sesion();
                println!("Sesión cerrada.");
                self.entrar(Route::Home).await;
            }
            "estado" => self.estado(),
            "nuevo-autor" | "editar-autor" | "borrar-autor" => self.comando_autores(cmd, resto).await,
            "nuevo-libro" | "editar-libro" | "borrar-libro" => self.comando_libros(cmd, resto).await,
            _ => eprintln!("comando desconocido: {} (escribe 'ayuda')", cmd),
        }
    }

    fn si_lista_filtros_cambiados(&mut self) {
        if self.en_vista_de_lista() {
            self.filtros_cambiados();
        } else {
            println!("(filtros guardados; 'ir /biblioteca' para ver la lista)");
        }
    }

    async fn login(&mut self, rl: &mut DefaultEditor, resto: &str) {
        let username = if resto.is_empty() { whoami::username() } else { resto.to_string() };
        let password = match rl.readline(&format!("contraseña para {}: ", username)) {
            Ok(p) => p,
            Err(_) => return,
        };
        let form = LoginForm { username, password };
        match self.client.iniciar_sesion(&form).await {
            Ok(identity) => {
                println!("Hola, {}.", identity.username);
                let destino = resolve_post_login(&self.pending);
                self.entrar(destino).await;
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    async fn registro(&mut self, rl: &mut DefaultEditor, resto: &str) {
        let mut partes = resto.split_whitespace();
        let (Some(username), Some(email)) = (partes.next(), partes.next()) else {
            eprintln!("uso: registro <usuario> <email>");
            return;
        };
        let Ok(password) = rl.readline("contraseña: ") else { return };
        let Ok(confirmacion) = rl.readline("confirma la contraseña: ") else { return };
        let form = RegistroForm {
            username: username.to_string(),
            email: email.to_string(),
            password,
            confirmacion,
        };
        match self.client.registrar(&form).await {
            Ok(msg) => {
                println!("{}", msg);
                self.entrar(Route::Login).await;
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    fn estado(&self) {
        match self.store.current() {
            Some(id) => {
                let roles: Vec<String> = id.roles.iter().map(|r| r.to_string()).collect();
                println!("usuario: {} <{}>", id.username, id.email);
                println!("roles:   {}", roles.join(", "));
            }
            None => println!("sin sesión"),
        }
        println!("vista:   {}", self.nav.actual().path());
    }

    /// Admin mutations are guarded actions: they run only under the same
    /// decision that guards the admin views.
    fn autorizar_admin(&mut self) -> bool {
        match evaluate(&Route::Admin, &self.store) {
            AccessDecision::Granted => true,
            AccessDecision::DeniedUnauthenticated => {
                self.pending.set(Route::Admin.path());
                println!("Necesitas iniciar sesión para administrar el catálogo");
                self.nav.goto(Route::Login);
                false
            }
            AccessDecision::DeniedForbidden => {
                println!("No estás autorizado para administrar el catálogo");
                false
            }
        }
    }

    async fn comando_autores(&mut self, cmd: &str, resto: &str) {
        if !self.autorizar_admin() {
            return;
        }
        let resultado = match cmd {
            "nuevo-autor" => match partes_pipa(resto, 2) {
                Some(p) => self
                    .client
                    .crear_autor(&AutorForm { nombre: p[0].clone(), pais: p[1].clone() })
                    .await
                    .map(|a| format!("autor #{} creado", a.id_autor)),
                None => {
                    eprintln!("uso: nuevo-autor <nombre>|<pais>");
                    return;
                }
            },
            "editar-autor" => {
                let Some((id, datos)) = resto.split_once(char::is_whitespace) else {
                    eprintln!("uso: editar-autor <id> <nombre>|<pais>");
                    return;
                };
                match (id.parse::<i64>(), partes_pipa(datos.trim(), 2)) {
                    (Ok(id), Some(p)) => self
                        .client
                        .actualizar_autor(id, &AutorForm { nombre: p[0].clone(), pais: p[1].clone() })
                        .await
                        .map(|a| format!("autor #{} actualizado", a.id_autor)),
                    _ => {
                        eprintln!("uso: editar-autor <id> <nombre>|<pais>");
                        return;
                    }
                }
            }
            _ => match resto.parse::<i64>() {
                Ok(id) => self.client.eliminar_autor(id).await,
                Err(_) => {
                    eprintln!("uso: borrar-autor <id>");
                    return;
                }
            },
        };
        match resultado {
            Ok(msg) => {
                println!("{}", msg);
                let _ = self.render(&Route::AdminAutores).await;
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    async fn comando_libros(&mut self, cmd: &str, resto: &str) {
        if !self.autorizar_admin() {
            return;
        }
        let resultado = match cmd {
            "nuevo-libro" => match formulario_libro(resto) {
                Some(form) => self
                    .client
                    .crear_libro(&form)
                    .await
                    .map(|l| format!("libro #{} creado", l.id_libro)),
                None => {
                    eprintln!("uso: nuevo-libro <titulo>|<anio>|<id_autor>[|<ruta_portada>]");
                    return;
                }
            },
            "editar-libro" => {
                let Some((id, datos)) = resto.split_once(char::is_whitespace) else {
                    eprintln!("uso: editar-libro <id> <titulo>|<anio>|<id_autor>[|<ruta_portada>|quitar]");
                    return;
                };
                match (id.parse::<i64>(), formulario_libro(datos.trim())) {
                    (Ok(id), Some(form)) => self
                        .client
                        .actualizar_libro(id, &form)
                        .await
                        .map(|l| format!("libro #{} actualizado", l.id_libro)),
                    _ => {
                        eprintln!("uso: editar-libro <id> <titulo>|<anio>|<id_autor>[|<ruta_portada>|quitar]");
                        return;
                    }
                }
            }
            _ => match resto.parse::<i64>() {
                Ok(id) => self.client.eliminar_libro(id).await,
                Err(_) => {
                    eprintln!("uso: borrar-libro <id>");
                    return;
                }
            },
        };
        match resultado {
            Ok(msg) => {
                println!("{}", msg);
                if let Err(e) = self.recargar().await {
                    eprintln!("Error: {}", e);
                } else if self.en_vista_de_lista() {
                    self.mostrar_lista();
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}

fn partes_pipa(s: &str, n: usize) -> Option<Vec<String>> {
    let partes: Vec<String> = s.split('|').map(|p| p.trim().to_string()).collect();
    if partes.len() == n && partes.iter().all(|p| !p.is_empty()) {
        Some(partes)
    } else {
        None
    }
}

/// `<titulo>|<anio>|<id_autor>[|<ruta_portada>|quitar]`
fn formulario_libro(s: &str) -> Option<LibroForm> {
    let partes: Vec<&str> = s.split('|').map(str::trim).collect();
    if partes.len() < 3 || partes[..3].iter().any(|p| p.is_empty()) {
        return None;
    }
    let anio = partes[1].parse::<i32>().ok()?;
    let id_autor = partes[2].parse::<i64>().ok()?;
    let mut form = LibroForm {
        titulo: partes[0].to_string(),
        anio,
        id_autor,
        ..LibroForm::default()
    };
    for extra in &partes[3..] {
        if extra.eq_ignore_ascii_case("quitar") {
            form.remove_image = true;
        } else if !extra.is_empty() {
            form.portada = Some(std::path::PathBuf::from(extra));
        }
    }
    Some(form)
}

fn imprimir_ayuda() {
    println!(
        "Comandos:\n  ir <ruta>                     navegar (/home /biblioteca /libro/<id> /admin /admin/libros /admin/autores)\n  recargar                      volver a pedir libros y autores al servidor\n  buscar [texto]                filtrar por título (vacío = todos)\n  autor <id|todos>              filtrar por autor\n  anio <año|todos>              filtrar por año\n  orden <recientes|titulo|anio> ordenar la lista\n  pagina <n>                    ir a la página n\n  limpiar                       quitar filtros y orden\n  login [usuario]               iniciar sesión (usuario por defecto: el del sistema)\n  registro <usuario> <email>    crear una cuenta\n  logout                        cerrar sesión\n  estado                        sesión y vista actuales\n  nuevo-autor <nombre>|<pais>\n  editar-autor <id> <nombre>|<pais>\n  borrar-autor <id>\n  nuevo-libro <titulo>|<anio>|<id_autor>[|<ruta_portada>]\n  editar-libro <id> <titulo>|<anio>|<id_autor>[|<ruta_portada>|quitar]\n  borrar-libro <id>\n  salir"
    );
}
