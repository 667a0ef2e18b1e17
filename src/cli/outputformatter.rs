//! ASCII-table rendering for the shell views, bounded by the detected
//! terminal width.

use terminal_size::{terminal_size, Height, Width};

use crate::catalog::query::QueryOutcome;
use crate::catalog::{Autor, Libro};

/// Render the visible slice of the library view plus its paging footer.
pub fn imprimir_libros(outcome: &QueryOutcome, pagina: usize) {
    if outcome.visibles.is_empty() {
        println!("No se encontraron resultados");
        return;
    }
    let cols = ["id", "titulo", "anio", "autor", "portada"];
    let rows: Vec<Vec<String>> = outcome
        .visibles
        .iter()
        .map(|l| {
            vec![
                l.id_libro.to_string(),
                l.titulo.clone(),
                l.anio.to_string(),
                l.nombre_autor(),
                match &l.portada {
                    Some(p) if !p.is_empty() => p.clone(),
                    _ => "-".to_string(),
                },
            ]
        })
        .collect();
    imprimir_tabla(&cols, &rows);
    println!(
        "Mostrando {} de {} libro(s), página {} de {}",
        outcome.visibles.len(),
        outcome.total_filtrados,
        pagina,
        outcome.total_paginas
    );
}

pub fn imprimir_autores(autores: &[Autor]) {
    if autores.is_empty() {
        println!("No hay autores registrados");
        return;
    }
    let cols = ["id", "nombre", "pais", "libros"];
    let rows: Vec<Vec<String>> = autores
        .iter()
        .map(|a| {
            vec![
                a.id_autor.to_string(),
                a.nombre.clone(),
                a.pais.clone(),
                a.libros.as_ref().map(|ls| ls.len().to_string()).unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    imprimir_tabla(&cols, &rows);
    println!("autores: {}", autores.len());
}

/// Single-book detail view.
pub fn imprimir_libro(libro: &Libro, url_portada: &str) {
    println!("Libro #{}", libro.id_libro);
    println!("  titulo:  {}", libro.titulo);
    println!("  anio:    {}", libro.anio);
    println!("  autor:   {}", libro.nombre_autor());
    println!("  portada: {}", url_portada);
    if let Some(ts) = &libro.created_at {
        println!("  creado:  {}", ts.to_rfc3339());
    }
}

fn imprimir_tabla(cols: &[&str], rows: &[Vec<String>]) {
    let termw = get_terminal_width();
    // Column widths from content, capped so one long title cannot push the
    // table past the terminal edge.
    let cap = (termw / cols.len().max(1)).max(8);
    let mut widths: Vec<usize> = cols.iter().map(|c| c.chars().count().min(cap)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = cell.chars().count().min(cap);
            if w > widths[i] {
                widths[i] = w;
            }
        }
    }

    let sep = build_separator(&widths);
    println!("{}", sep);
    println!("{}", build_header(cols, &widths));
    println!("{}", sep);
    for r in rows {
        println!("{}", build_row(r, &widths));
    }
    println!("{}", sep);
}

fn get_terminal_width() -> usize {
    if let Some((Width(w), Height(_h))) = terminal_size() {
        return (w.saturating_sub(4)) as usize;
    }
    80
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

// Header row with column names colored green; padding uses the uncolored
// width so alignment survives the escape codes.
fn build_header(cells: &[&str], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).copied().unwrap_or_default();
        let text = truncate(cell, *w);
        s.push(' ');
        s.push_str(&format!("\x1b[32m{}\x1b[0m", text));
        s.push_str(&" ".repeat(w.saturating_sub(text.chars().count())));
        s.push(' ');
        s.push('|');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let text = truncate(&cell, *w);
        let pad = w.saturating_sub(text.chars().count());
        s.push(' ');
        if is_numeric_like(&cell) {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    // crude detection for aligning numbers to the right
    let st = s.trim();
    if st.is_empty() {
        return false;
    }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() {
            has_digit = true;
            continue;
        }
        if ".-+eE,_".contains(ch) {
            continue;
        }
        return false;
    }
    has_digit
}
