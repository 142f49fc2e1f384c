use maud::{DOCTYPE, Markup, html};

use crate::{
    catalog::FiltroPeliculas,
    entities::{genero, horario, pelicula, sala, venta},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

pub fn home_page(
    peliculas: &[(pelicula::Model, Option<genero::Model>)],
    generos: &[genero::Model],
    filtro: &FiltroPeliculas,
) -> String {
    page(
        "Cartelera",
        html! {
            div class="max-w-4xl mx-auto px-6 py-10" {
                div class="flex items-start justify-between gap-6" {
                    h1 class="text-3xl font-bold text-gray-900" { "Cartelera" }
                    (nav_links())
                }

                form class="mt-6 bg-white shadow rounded-lg p-6 grid gap-4 md:grid-cols-5" method="get" action="/" {
                    input class="md:col-span-2 rounded-md border border-gray-300 px-3 py-2" type="text" name="q" placeholder="Buscar título, director, actores..." value=(filtro.q.as_deref().unwrap_or(""));

                    select class="rounded-md border border-gray-300 px-3 py-2" name="genero_id" {
                        option value="" { "Todos los géneros" }
                        @for g in generos {
                            @if filtro.genero_id == Some(g.id) {
                                option value=(g.id) selected { (g.name_genre) }
                            } @else {
                                option value=(g.id) { (g.name_genre) }
                            }
                        }
                    }

                    input class="rounded-md border border-gray-300 px-3 py-2" type="number" name="duracion_max" placeholder="Duración máx." value=[filtro.duracion_max];

                    div class="flex items-center gap-3" {
                        label class="flex items-center gap-2 text-sm text-gray-700" {
                            input type="checkbox" name="disponible" value="True" checked[filtro.disponible];
                            "Solo disponibles"
                        }
                        button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Filtrar" }
                    }
                }

                @if peliculas.is_empty() {
                    div class="mt-8 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "No hay películas que coincidan con los filtros." }
                    }
                } @else {
                    div class="mt-8 space-y-4" {
                        @for (p, g) in peliculas {
                            (pelicula_card(p, g.as_ref()))
                        }
                    }
                }
            }
        },
    )
}

fn pelicula_card(p: &pelicula::Model, g: Option<&genero::Model>) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6" {
            div class="flex items-start justify-between gap-4" {
                div {
                    h2 class="text-xl font-semibold text-gray-900" {
                        (p.titulo)
                        span class="ml-2 font-normal text-gray-500" { "(" (p.duracion) " min)" }
                    }
                    @if let Some(g) = g {
                        p class="mt-1 text-sm text-gray-500" { (g.name_genre) }
                    }
                    @if let Some(director) = &p.director {
                        p class="mt-1 text-sm text-gray-600" { "Dirigida por " (director) }
                    }
                    @if let Some(descripcion) = &p.descripcion {
                        p class="mt-2 text-sm text-gray-700" { (descripcion) }
                    }
                }
                @if p.disponible {
                    span class="rounded-full bg-green-100 px-3 py-1 text-xs font-medium text-green-800" { "En cartelera" }
                } @else {
                    span class="rounded-full bg-gray-100 px-3 py-1 text-xs font-medium text-gray-600" { "No disponible" }
                }
            }
        }
    }
}

pub fn peliculas_page(rows: &[(pelicula::Model, Option<genero::Model>)]) -> String {
    listado(
        "Películas",
        html! {
            table class="mt-6 w-full bg-white shadow rounded-lg text-sm" {
                thead { tr class="text-left text-gray-500" {
                    th class="px-4 py-3" { "Id" }
                    th class="px-4 py-3" { "Título" }
                    th class="px-4 py-3" { "Género" }
                    th class="px-4 py-3" { "Duración" }
                    th class="px-4 py-3" { "Disponible" }
                } }
                tbody {
                    @for (p, g) in rows {
                        tr class="border-t border-gray-100" {
                            td class="px-4 py-3" { (p.id) }
                            td class="px-4 py-3 font-medium" { (p.titulo) }
                            td class="px-4 py-3" { (g.as_ref().map(|g| g.name_genre.as_str()).unwrap_or("—")) }
                            td class="px-4 py-3" { (p.duracion) " min" }
                            td class="px-4 py-3" { (si_no(p.disponible)) }
                        }
                    }
                }
            }
        },
    )
}

pub fn generos_page(generos: &[genero::Model]) -> String {
    listado(
        "Géneros",
        html! {
            table class="mt-6 w-full bg-white shadow rounded-lg text-sm" {
                thead { tr class="text-left text-gray-500" {
                    th class="px-4 py-3" { "Id" }
                    th class="px-4 py-3" { "Nombre" }
                } }
                tbody {
                    @for g in generos {
                        tr class="border-t border-gray-100" {
                            td class="px-4 py-3" { (g.id) }
                            td class="px-4 py-3 font-medium" { (g.name_genre) }
                        }
                    }
                }
            }
        },
    )
}

pub fn salas_page(salas: &[sala::Model]) -> String {
    listado(
        "Salas",
        html! {
            table class="mt-6 w-full bg-white shadow rounded-lg text-sm" {
                thead { tr class="text-left text-gray-500" {
                    th class="px-4 py-3" { "Id" }
                    th class="px-4 py-3" { "Nombre" }
                    th class="px-4 py-3" { "Capacidad" }
                    th class="px-4 py-3" { "Tipo" }
                    th class="px-4 py-3" { "Precio" }
                } }
                tbody {
                    @for s in salas {
                        tr class="border-t border-gray-100" {
                            td class="px-4 py-3" { (s.id) }
                            td class="px-4 py-3 font-medium" { (s.nombre) }
                            td class="px-4 py-3" { (s.capacidad) }
                            td class="px-4 py-3" { (s.tipo) }
                            td class="px-4 py-3" { (format!("{:.2} €", s.precio)) }
                        }
                    }
                }
            }
        },
    )
}

pub fn horarios_page(rows: &[(horario::Model, Option<sala::Model>)]) -> String {
    listado(
        "Horarios",
        html! {
            table class="mt-6 w-full bg-white shadow rounded-lg text-sm" {
                thead { tr class="text-left text-gray-500" {
                    th class="px-4 py-3" { "Id" }
                    th class="px-4 py-3" { "Película" }
                    th class="px-4 py-3" { "Sala" }
                    th class="px-4 py-3" { "Hora" }
                    th class="px-4 py-3" { "Disponible" }
                } }
                tbody {
                    @for (h, s) in rows {
                        tr class="border-t border-gray-100" {
                            td class="px-4 py-3" { (h.id) }
                            td class="px-4 py-3" { "#" (h.pelicula_id) }
                            td class="px-4 py-3" { (s.as_ref().map(|s| s.nombre.as_str()).unwrap_or("—")) }
                            td class="px-4 py-3 font-medium" { (h.hora) }
                            td class="px-4 py-3" { (si_no(h.disponible)) }
                        }
                    }
                }
            }
        },
    )
}

pub fn ventas_page(ventas: &[venta::Model]) -> String {
    listado(
        "Ventas",
        html! {
            div class="mt-4" {
                a class="inline-block rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" href="/ventas/new" { "Nueva venta" }
            }
            table class="mt-4 w-full bg-white shadow rounded-lg text-sm" {
                thead { tr class="text-left text-gray-500" {
                    th class="px-4 py-3" { "Id" }
                    th class="px-4 py-3" { "Horario" }
                    th class="px-4 py-3" { "Cantidad" }
                    th class="px-4 py-3" { "Precio total" }
                    th class="px-4 py-3" { "Método de pago" }
                } }
                tbody {
                    @for v in ventas {
                        tr class="border-t border-gray-100" {
                            td class="px-4 py-3" { (v.id) }
                            td class="px-4 py-3" { "#" (v.horario_id) }
                            td class="px-4 py-3" { (v.cantidad) }
                            td class="px-4 py-3 font-medium" { (format!("{:.2} €", v.precio_total)) }
                            td class="px-4 py-3" { (v.metodo_pago.as_str()) }
                        }
                    }
                }
            }
        },
    )
}

/// Raw form values so a failed submission repaints what the user typed.
#[derive(Clone, Debug, Default)]
pub struct VentaFormData {
    pub horario_id: String,
    pub cantidad: String,
    pub metodo_pago: String,
}

pub fn venta_form_page(
    horarios: &[horario::Model],
    errores: &[String],
    form: &VentaFormData,
) -> String {
    page(
        "Nueva venta",
        html! {
            div class="max-w-2xl mx-auto px-6 py-10" {
                div class="flex items-start justify-between gap-6" {
                    h1 class="text-3xl font-bold text-gray-900" { "Nueva venta" }
                    a class="text-sm text-blue-600 hover:text-blue-800" href="/ventas" { "Volver" }
                }

                @if !errores.is_empty() {
                    div class="mt-6 rounded-md bg-red-50 border border-red-200 p-4" {
                        ul class="space-y-1 text-sm text-red-700" {
                            @for error in errores {
                                li { (error) }
                            }
                        }
                    }
                }

                form class="mt-6 bg-white shadow rounded-lg p-6 space-y-5" method="post" action="/ventas/new" {
                    div {
                        label class="block text-sm font-medium text-gray-700" for="horario_id" { "Horario" }
                        select class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2" name="horario_id" id="horario_id" {
                            option value="" { "Selecciona un horario" }
                            @for h in horarios {
                                @if form.horario_id == h.id.to_string() {
                                    option value=(h.id) selected { "#" (h.id) " · " (h.hora) }
                                } @else {
                                    option value=(h.id) { "#" (h.id) " · " (h.hora) }
                                }
                            }
                        }
                    }

                    div {
                        label class="block text-sm font-medium text-gray-700" for="cantidad" { "Cantidad de entradas" }
                        input class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2" type="number" name="cantidad" id="cantidad" min="1" value=(form.cantidad);
                    }

                    div {
                        label class="block text-sm font-medium text-gray-700" for="metodo_pago" { "Método de pago" }
                        select class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2" name="metodo_pago" id="metodo_pago" {
                            @for metodo in ["tarjeta", "efectivo"] {
                                @if form.metodo_pago == metodo {
                                    option value=(metodo) selected { (metodo) }
                                } @else {
                                    option value=(metodo) { (metodo) }
                                }
                            }
                        }
                    }

                    button class="w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Registrar venta" }
                }
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Error" }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Volver" }
                    }
                }
            }
        },
    )
}

fn listado(titulo: &str, cuerpo: Markup) -> String {
    page(
        titulo,
        html! {
            div class="max-w-4xl mx-auto px-6 py-10" {
                div class="flex items-start justify-between gap-6" {
                    h1 class="text-3xl font-bold text-gray-900" { (titulo) }
                    (nav_links())
                }
                (cuerpo)
            }
        },
    )
}

fn nav_links() -> Markup {
    html! {
        nav class="flex gap-4 text-sm text-blue-600" {
            a class="hover:text-blue-800" href="/" { "Inicio" }
            a class="hover:text-blue-800" href="/peliculas" { "Películas" }
            a class="hover:text-blue-800" href="/genres" { "Géneros" }
            a class="hover:text-blue-800" href="/salas" { "Salas" }
            a class="hover:text-blue-800" href="/horarios" { "Horarios" }
            a class="hover:text-blue-800" href="/ventas" { "Ventas" }
        }
    }
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="es" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · Cartelera" }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" { (body) }
        }
    }
    .into_string()
}

fn si_no(valor: bool) -> &'static str {
    if valor { "Sí" } else { "No" }
}
