//! Pure filter/sort/paginate pipeline over an in-memory book collection.
//! The same engine backs the public library view and the admin book list,
//! so the steps run in one fixed order and the function has no failure
//! modes: degenerate inputs yield empty results.

use std::collections::BTreeSet;

use super::types::Libro;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutorFilter {
    Todos,
    Autor(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnioFilter {
    Todos,
    Anio(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Input order as delivered by the collaborator. The backend sends
    /// newest-first; the engine does not re-derive recency from ids or
    /// timestamps, so this mode is only as good as that contract.
    Recientes,
    TituloAsc,
    AnioDesc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub busqueda: String,
    pub autor: AutorFilter,
    pub anio: AnioFilter,
    pub orden: SortMode,
    /// 1-based page index.
    pub pagina: usize,
    pub por_pagina: usize,
}

pub const POR_PAGINA: usize = 12;

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            busqueda: String::new(),
            autor: AutorFilter::Todos,
            anio: AnioFilter::Todos,
            orden: SortMode::Recientes,
            pagina: 1,
            por_pagina: POR_PAGINA,
        }
    }
}

impl QueryParams {
    pub fn tiene_filtros(&self) -> bool {
        !self.busqueda.is_empty()
            || self.autor != AutorFilter::Todos
            || self.anio != AnioFilter::Todos
            || self.orden != SortMode::Recientes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    /// The post-filter/sort/paginate slice shown to the user.
    pub visibles: Vec<Libro>,
    pub total_filtrados: usize,
    pub total_paginas: usize,
    /// Distinct years of the UNFILTERED input, descending, so the year
    /// dropdown always offers the full range regardless of active filters.
    pub anios_disponibles: Vec<i32>,
}

/// Apply `params` to `libros`. Pure: the input slice is never reordered or
/// mutated, and the same parameters over the same input always produce the
/// same outcome.
pub fn apply(libros: &[Libro], params: &QueryParams) -> QueryOutcome {
    let anios_disponibles = anios_de(libros);

    // 1. Title substring, case-insensitive. Empty search matches everything.
    let busqueda = params.busqueda.to_lowercase();
    let mut filtrados: Vec<Libro> = libros
        .iter()
        .filter(|l| busqueda.is_empty() || l.titulo.to_lowercase().contains(&busqueda))
        // 2. Exact author id.
        .filter(|l| match params.autor {
            AutorFilter::Todos => true,
            AutorFilter::Autor(id) => l.id_autor == id,
        })
        // 3. Exact year. The original UI compares the decimal rendering of
        //    the year against the dropdown string; for integer years that
        //    coincides with integer equality.
        .filter(|l| match params.anio {
            AnioFilter::Todos => true,
            AnioFilter::Anio(a) => l.anio == a,
        })
        .cloned()
        .collect();

    // 4. Sort. Both explicit modes use the stable Vec sort so equal keys
    //    keep their relative input order.
    match params.orden {
        SortMode::Recientes => {}
        SortMode::TituloAsc => {
            filtrados.sort_by(|a, b| {
                a.titulo.to_lowercase().cmp(&b.titulo.to_lowercase()).then_with(|| a.titulo.cmp(&b.titulo))
            });
        }
        SortMode::AnioDesc => filtrados.sort_by(|a, b| b.anio.cmp(&a.anio)),
    }

    // 5. Paginate, 1-indexed.
    let total_filtrados = filtrados.len();
    let total_paginas = if params.por_pagina == 0 {
        0
    } else {
        total_filtrados.div_ceil(params.por_pagina)
    };
    let visibles = if params.por_pagina == 0 || params.pagina == 0 {
        Vec::new()
    } else {
        let inicio = (params.pagina - 1).saturating_mul(params.por_pagina);
        let fin = inicio.saturating_add(params.por_pagina).min(total_filtrados);
        if inicio >= total_filtrados { Vec::new() } else { filtrados[inicio..fin].to_vec() }
    };

    QueryOutcome { visibles, total_filtrados, total_paginas, anios_disponibles }
}

/// Clamp the page index into `[1, total_paginas]`. Callers run this after
/// changing any filter or sort field; bare page navigation skips it.
pub fn clamp_pagina(params: &mut QueryParams, total_paginas: usize) {
    let max = total_paginas.max(1);
    params.pagina = params.pagina.clamp(1, max);
}

fn anios_de(libros: &[Libro]) -> Vec<i32> {
    let set: BTreeSet<i32> = libros.iter().map(|l| l.anio).collect();
    set.into_iter().rev().collect()
}
