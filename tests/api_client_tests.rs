//! Remote resource client tests against a stub collaborator. These cover
//! token injection, central 401 handling, verbatim error propagation and
//! the multipart content-type invariant.

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::json;
use tempfile::tempdir;

use libroteca::client::{ApiClient, Navigator};
use libroteca::identity::{roles_from_wire, Route, SessionStore, UserIdentity};
use libroteca::validation::LoginForm;

#[derive(Default)]
struct NavRecorder {
    rutas: Mutex<Vec<Route>>,
}

impl NavRecorder {
    fn visitadas(&self) -> Vec<Route> {
        self.rutas.lock().clone()
    }
}

impl Navigator for NavRecorder {
    fn goto(&self, route: Route) {
        self.rutas.lock().push(route);
    }
}

async fn lanzar_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn identidad() -> UserIdentity {
    UserIdentity {
        id: 1,
        username: "maria".into(),
        email: "maria@example.com".into(),
        roles: roles_from_wire(&["ROLE_USER".to_string()]),
        token: "tok-123".into(),
    }
}

#[tokio::test]
async fn unauthorized_clears_session_and_redirects_to_login() {
    let app = Router::new().route(
        "/api/autores",
        get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "success": false, "message": "token inválido" }))) }),
    );
    let base = lanzar_stub(app).await;

    let tmp = tempdir().unwrap();
    let store = Arc::new(SessionStore::open(tmp.path()));
    store.save(&identidad()).unwrap();
    let nav = Arc::new(NavRecorder::default());
    let client = ApiClient::new(&base, store.clone(), nav.clone()).unwrap();

    let err = client.listar_autores().await.unwrap_err();
    assert!(err.is_auth());
    // Session is gone, durably, and the shell was sent to login.
    assert!(store.load().is_none());
    assert_eq!(nav.visitadas(), vec![Route::Login]);
}

#[tokio::test]
async fn unauthorized_handling_is_endpoint_independent() {
    let rechazo = || async { (StatusCode::UNAUTHORIZED, Json(json!({ "success": false, "message": "no" }))) };
    let app = Router::new()
        .route("/api/libros", get(rechazo.clone()))
        .route("/api/libros/{id}", axum::routing::delete(rechazo));
    let base = lanzar_stub(app).await;

    let tmp = tempdir().unwrap();
    let store = Arc::new(SessionStore::open(tmp.path()));
    store.save(&identidad()).unwrap();
    let nav = Arc::new(NavRecorder::default());
    let client = ApiClient::new(&base, store.clone(), nav.clone()).unwrap();

    assert!(client.listar_libros().await.unwrap_err().is_auth());
    assert!(client.eliminar_libro(3).await.unwrap_err().is_auth());
    assert_eq!(nav.visitadas(), vec![Route::Login, Route::Login]);
}

#[tokio::test]
async fn token_header_travels_with_every_request() {
    let visto: Arc<Mutex<Option<String>>> = Arc::default();
    let visto_stub = visto.clone();
    let app = Router::new().route(
        "/api/libros",
        get(move |headers: HeaderMap| {
            let visto = visto_stub.clone();
            async move {
                *visto.lock() = headers
                    .get("x-access-token")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);
                Json(json!({ "success": true, "data": [], "message": "ok" }))
            }
        }),
    );
    let base = lanzar_stub(app).await;

    let tmp = tempdir().unwrap();
    let store = Arc::new(SessionStore::open(tmp.path()));
    store.save(&identidad()).unwrap();
    let nav = Arc::new(NavRecorder::default());
    let client = ApiClient::new(&base, store, nav).unwrap();

    client.listar_libros().await.unwrap();
    assert_eq!(visto.lock().as_deref(), Some("tok-123"));
}

#[tokio::test]
async fn anonymous_requests_carry_no_token() {
    let visto: Arc<Mutex<Option<String>>> = Arc::default();
    let visto_stub = visto.clone();
    let app = Router::new().route(
        "/api/libros",
        get(move |headers: HeaderMap| {
            let visto = visto_stub.clone();
            async move {
                *visto.lock() = headers
                    .get("x-access-token")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);
                Json(json!({ "success": true, "data": [], "message": "ok" }))
            }
        }),
    );
    let base = lanzar_stub(app).await;

    let tmp = tempdir().unwrap();
    let store = Arc::new(SessionStore::open(tmp.path()));
    let nav = Arc::new(NavRecorder::default());
    let client = ApiClient::new(&base, store, nav).unwrap();

    client.listar_libros().await.unwrap();
    assert_eq!(*visto.lock(), None);
}

#[tokio::test]
async fn collaborator_message_propagates_verbatim() {
    let app = Router::new().route(
        "/api/libros/{id}",
        get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "success": false, "message": "libro no encontrado" }))) }),
    );
    let base = lanzar_stub(app).await;

    let tmp = tempdir().unwrap();
    let store = Arc::new(SessionStore::open(tmp.path()));
    let nav = Arc::new(NavRecorder::default());
    let client = ApiClient::new(&base, store, nav.clone()).unwrap();

    let err = client.obtener_libro(99).await.unwrap_err();
    assert_eq!(err.message(), "libro no encontrado");
    assert_eq!(err.http_status(), 404);
    // Non-auth failures never touch the session or navigation.
    assert!(nav.visitadas().is_empty());
}

#[tokio::test]
async fn missing_data_on_a_list_endpoint_is_an_empty_collection() {
    let app = Router::new().route(
        "/api/libros",
        get(|| async { Json(json!({ "success": true, "message": "ok" })) }),
    );
    let base = lanzar_stub(app).await;

    let tmp = tempdir().unwrap();
    let store = Arc::new(SessionStore::open(tmp.path()));
    let nav = Arc::new(NavRecorder::default());
    let client = ApiClient::new(&base, store, nav).unwrap();

    let libros = client.listar_libros().await.unwrap();
    assert!(libros.is_empty());
}

#[tokio::test]
async fn signin_persists_the_delivered_identity() {
    let app = Router::new().route(
        "/api/auth/signin",
        post(|| async {
            Json(json!({
                "id": 7,
                "username": "maria",
                "email": "maria@example.com",
                "roles": ["ROLE_USER", "ROLE_ADMIN"],
                "accessToken": "tok-nuevo"
            }))
        }),
    );
    let base = lanzar_stub(app).await;

    let tmp = tempdir().unwrap();
    let store = Arc::new(SessionStore::open(tmp.path()));
    let nav = Arc::new(NavRecorder::default());
    let client = ApiClient::new(&base, store.clone(), nav).unwrap();

    let form = LoginForm { username: "maria".into(), password: "secreto".into() };
    let identity = client.iniciar_sesion(&form).await.unwrap();
    assert!(identity.has_role("admin"));

    let persistida = store.load().unwrap();
    assert_eq!(persistida.token, "tok-nuevo");
    assert!(store.has_role("admin"));
}

#[tokio::test]
async fn signin_with_invalid_fields_never_reaches_the_network() {
    // No stub at all: a validation failure must short-circuit locally.
    let tmp = tempdir().unwrap();
    let store = Arc::new(SessionStore::open(tmp.path()));
    let nav = Arc::new(NavRecorder::default());
    let client = ApiClient::new("http://127.0.0.1:9/api", store.clone(), nav).unwrap();

    let form = LoginForm { username: "maria".into(), password: "corta".into() };
    let err = client.iniciar_sesion(&form).await.unwrap_err();
    assert_eq!(err.http_status(), 400);
    assert!(err.message().contains("al menos 6"));
    assert!(store.load().is_none());
}

#[tokio::test]
async fn multipart_update_lets_the_transport_set_the_boundary() {
    let tipo: Arc<Mutex<Option<String>>> = Arc::default();
    let tipo_stub = tipo.clone();
    let app = Router::new().route(
        "/api/libros/{id}",
        put(move |headers: HeaderMap| {
            let tipo = tipo_stub.clone();
            async move {
                *tipo.lock() = headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);
                Json(json!({
                    "success": true,
                    "data": { "id_libro": 5, "titulo": "El túnel", "anio": 1948, "portada": "tapa.png", "id_autor": 2 },
                    "message": "actualizado"
                }))
            }
        }),
    );
    let base = lanzar_stub(app).await;

    let tmp = tempdir().unwrap();
    let portada = tmp.path().join("tapa.png");
    std::fs::write(&portada, b"png-bytes").unwrap();

    let store = Arc::new(SessionStore::open(tmp.path()));
    store.save(&identidad()).unwrap();
    let nav = Arc::new(NavRecorder::default());
    let client = ApiClient::new(&base, store, nav).unwrap();

    let form = libroteca::catalog::LibroForm {
        titulo: "El túnel".into(),
        anio: 1948,
        id_autor: 2,
        portada: Some(portada),
        remove_image: false,
    };
    let libro = client.actualizar_libro(5, &form).await.unwrap();
    assert_eq!(libro.id_libro, 5);

    let tipo = tipo.lock().clone().expect("content-type presente");
    assert!(tipo.starts_with("multipart/form-data; boundary="), "content-type inesperado: {}", tipo);
}
