//! Catalog query engine tests: filter composition, sort stability,
//! pagination arithmetic and the unfiltered year facet.

use libroteca::catalog::query::{apply, clamp_pagina, AnioFilter, AutorFilter, QueryParams, SortMode};
use libroteca::catalog::Libro;

fn libro(id: i64, titulo: &str, anio: i32, id_autor: i64) -> Libro {
    Libro {
        id_libro: id,
        titulo: titulo.to_string(),
        anio,
        portada: None,
        id_autor,
        created_at: None,
        updated_at: None,
        autor: None,
    }
}

fn coleccion() -> Vec<Libro> {
    vec![
        libro(1, "Cien años de soledad", 1967, 1),
        libro(2, "El túnel", 1948, 2),
        libro(3, "Rayuela", 1963, 3),
        libro(4, "El Aleph", 1949, 4),
    ]
}

#[test]
fn same_params_twice_yield_identical_output() {
    let libros = coleccion();
    let params = QueryParams {
        busqueda: "el".into(),
        orden: SortMode::TituloAsc,
        ..QueryParams::default()
    };
    let primero = apply(&libros, &params);
    let segundo = apply(&libros, &params);
    assert_eq!(primero, segundo);
    // The input collection is untouched by sorting.
    assert_eq!(libros[0].id_libro, 1);
    assert_eq!(libros[3].id_libro, 4);
}

#[test]
fn search_is_case_insensitive_substring_on_title() {
    let libros = coleccion();
    let params = QueryParams { busqueda: "cien".into(), ..QueryParams::default() };
    let out = apply(&libros, &params);
    assert_eq!(out.total_filtrados, 1);
    assert_eq!(out.visibles[0].titulo, "Cien años de soledad");
}

#[test]
fn combining_with_non_matching_author_yields_empty() {
    let libros = coleccion();
    let params = QueryParams {
        busqueda: "cien".into(),
        autor: AutorFilter::Autor(2),
        ..QueryParams::default()
    };
    let out = apply(&libros, &params);
    assert_eq!(out.total_filtrados, 0);
    assert!(out.visibles.is_empty());
}

#[test]
fn year_filter_matches_exactly() {
    let libros = coleccion();
    let params = QueryParams { anio: AnioFilter::Anio(1948), ..QueryParams::default() };
    let out = apply(&libros, &params);
    assert_eq!(out.total_filtrados, 1);
    assert_eq!(out.visibles[0].titulo, "El túnel");
}

#[test]
fn titulo_asc_orders_lexicographically() {
    let libros = coleccion();
    let params = QueryParams { orden: SortMode::TituloAsc, ..QueryParams::default() };
    let out = apply(&libros, &params);
    let titulos: Vec<&str> = out.visibles.iter().map(|l| l.titulo.as_str()).collect();
    assert_eq!(titulos, vec!["Cien años de soledad", "El Aleph", "El túnel", "Rayuela"]);
}

#[test]
fn anio_desc_keeps_input_order_on_ties() {
    let libros = vec![
        libro(10, "Primero de 1950", 1950, 1),
        libro(11, "De 1980", 1980, 1),
        libro(12, "Segundo de 1950", 1950, 1),
    ];
    let params = QueryParams { orden: SortMode::AnioDesc, ..QueryParams::default() };
    let out = apply(&libros, &params);
    let ids: Vec<i64> = out.visibles.iter().map(|l| l.id_libro).collect();
    assert_eq!(ids, vec![11, 10, 12]);
}

#[test]
fn pagination_of_25_by_12_is_three_pages_with_one_on_the_last() {
    let libros: Vec<Libro> = (1..=25).map(|i| libro(i, &format!("Libro {}", i), 2000, 1)).collect();
    let mut params = QueryParams::default();
    assert_eq!(params.por_pagina, 12);

    let out = apply(&libros, &params);
    assert_eq!(out.total_filtrados, 25);
    assert_eq!(out.total_paginas, 3);
    assert_eq!(out.visibles.len(), 12);

    params.pagina = 3;
    let out = apply(&libros, &params);
    assert_eq!(out.visibles.len(), 1);
    assert_eq!(out.visibles[0].id_libro, 25);
}

#[test]
fn available_years_ignore_every_filter() {
    let libros = coleccion();
    let sin_filtros = apply(&libros, &QueryParams::default());
    let filtrado = apply(
        &libros,
        &QueryParams {
            busqueda: "cien".into(),
            autor: AutorFilter::Autor(2),
            anio: AnioFilter::Anio(1948),
            ..QueryParams::default()
        },
    );
    assert_eq!(sin_filtros.anios_disponibles, filtrado.anios_disponibles);
    assert_eq!(filtrado.anios_disponibles, vec![1967, 1963, 1949, 1948]);
}

#[test]
fn duplicate_years_appear_once_descending() {
    let libros = vec![
        libro(1, "A", 1990, 1),
        libro(2, "B", 2001, 1),
        libro(3, "C", 1990, 1),
    ];
    let out = apply(&libros, &QueryParams::default());
    assert_eq!(out.anios_disponibles, vec![2001, 1990]);
}

#[test]
fn clamp_after_filter_change_pulls_page_into_range() {
    let libros: Vec<Libro> = (1..=25).map(|i| libro(i, &format!("Libro {}", i), 2000, 1)).collect();
    let mut params = QueryParams { pagina: 3, ..QueryParams::default() };

    // Narrow the result set to one page; the old page index is now out of range.
    params.busqueda = "Libro 1".into();
    let out = apply(&libros, &params);
    clamp_pagina(&mut params, out.total_paginas);
    assert_eq!(params.pagina, out.total_paginas);

    let out = apply(&libros, &params);
    assert!(!out.visibles.is_empty());
}
