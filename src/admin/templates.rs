//! Generic rendering of the back-office: one list template and one form
//! template interpret the per-entity configuration.

use maud::{DOCTYPE, Markup, html};

use crate::admin::{
    AdminCell, AdminRow, FieldKind, FilterGroup, FormField,
    record::AdminForm,
    schema::{AdminConfig, Fieldset, MOVIE_FIELDSETS},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

pub fn login_page(error: bool) -> String {
    admin_shell(
        "Sign in",
        html! {
            div class="min-h-screen bg-gray-100 flex items-center justify-center" {
                form class="bg-white shadow rounded-lg p-8 w-full max-w-sm" method="post" action="/admin/login" {
                    h1 class="text-xl font-bold text-gray-900" { "Kinoteka admin" }
                    @if error {
                        p class="mt-3 rounded-md bg-red-50 px-3 py-2 text-sm text-red-700" {
                            "Wrong username or password."
                        }
                    }
                    label class="mt-4 block text-sm font-medium text-gray-700" for="username" { "Username" }
                    input class="mt-1 w-full rounded-md border border-gray-300 px-3 py-2" name="username" id="username" required;
                    label class="mt-4 block text-sm font-medium text-gray-700" for="password" { "Password" }
                    input class="mt-1 w-full rounded-md border border-gray-300 px-3 py-2" type="password" name="password" id="password" required;
                    button class="mt-6 w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Sign in" }
                }
            }
        },
    )
}

pub fn dashboard_page(entries: &[(&AdminConfig, u64)]) -> String {
    admin_page(
        "Dashboard",
        html! {
            h1 class="text-2xl font-bold text-gray-900" { "Catalog administration" }
            div class="mt-6 grid gap-4 sm:grid-cols-2 lg:grid-cols-4" {
                @for (config, count) in entries {
                    a class="bg-white shadow rounded-lg p-6 hover:shadow-md" href=(format!("/admin/{}", config.slug)) {
                        h2 class="font-semibold text-gray-900" { (config.title_plural) }
                        p class="mt-1 text-sm text-gray-500" { (count) " records" }
                    }
                }
            }
        },
    )
}

pub fn list_page(
    config: &AdminConfig,
    rows: &[AdminRow],
    filters: &[FilterGroup],
    q: Option<&str>,
    message: Option<&str>,
) -> String {
    let has_actions = !config.actions.is_empty();
    let has_editable = !config.list_editable.is_empty();

    admin_page(
        config.title_plural,
        html! {
            div class="flex items-center justify-between" {
                h1 class="text-2xl font-bold text-gray-900" { (config.title_plural) }
                a class="rounded-md bg-blue-600 px-4 py-2 text-sm font-semibold text-white hover:bg-blue-700"
                    href=(format!("/admin/{}/new", config.slug)) {
                    "Add " (config.title.to_lowercase())
                }
            }

            @if let Some(message) = message {
                p class="mt-4 rounded-md bg-green-50 px-4 py-2 text-sm text-green-800" { (message) }
            }

            @if !config.search_fields.is_empty() {
                form class="mt-4" method="get" action=(format!("/admin/{}", config.slug)) {
                    input class="w-64 rounded-md border border-gray-300 px-3 py-2 text-sm" name="q"
                        value=(q.unwrap_or("")) placeholder="Search…";
                    button class="ml-2 rounded-md border border-gray-300 px-4 py-2 text-sm" type="submit" { "Search" }
                }
            }

            div class="mt-6 flex gap-6" {
                div class="flex-1" {
                    form method="post" action=(format!("/admin/{}/action", config.slug)) {
                        @if has_actions {
                            div class="mb-4 flex items-center gap-2" {
                                select class="rounded-md border border-gray-300 px-3 py-2 text-sm" name="action" {
                                    @for action in config.actions {
                                        option value=(action.key()) { (action.label()) }
                                    }
                                }
                                button class="rounded-md border border-gray-300 px-4 py-2 text-sm" type="submit" { "Apply" }
                                @if has_editable {
                                    button class="rounded-md border border-gray-300 px-4 py-2 text-sm" type="submit"
                                        formaction=(format!("/admin/{}/drafts", config.slug)) {
                                        "Save drafts"
                                    }
                                }
                            }
                        }
                        (list_table(config, rows, has_actions, has_editable))
                    }
                }
                @if !filters.is_empty() {
                    aside class="w-56" { (filter_sidebar(config, filters)) }
                }
            }
        },
    )
}

fn list_table(
    config: &AdminConfig,
    rows: &[AdminRow],
    has_actions: bool,
    has_editable: bool,
) -> Markup {
    html! {
        div class="overflow-x-auto bg-white shadow rounded-lg" {
            table class="min-w-full text-sm" {
                thead class="bg-gray-50 text-left text-gray-500 uppercase tracking-wide text-xs" {
                    tr {
                        @if has_actions { th class="px-4 py-3 w-8" {} }
                        @for column in config.list_display {
                            th class="px-4 py-3" { (column.replace('_', " ")) }
                        }
                    }
                }
                tbody class="divide-y divide-gray-100" {
                    @for row in rows {
                        tr class="hover:bg-gray-50" {
                            @if has_actions {
                                td class="px-4 py-2" {
                                    input type="checkbox" name="selected" value=(row.id);
                                }
                            }
                            @for (column, cell) in config.list_display.iter().zip(&row.cells) {
                                td class="px-4 py-2" {
                                    @if has_editable && config.list_editable.contains(column) {
                                        (editable_cell(row.id, cell))
                                    } @else {
                                        (render_cell(cell))
                                    }
                                }
                            }
                        }
                    }
                }
            }
            @if rows.is_empty() {
                p class="px-4 py-6 text-gray-500" { "No records." }
            }
        }
    }
}

fn editable_cell(id: i32, cell: &AdminCell) -> Markup {
    match cell {
        AdminCell::Bool(value) => html! {
            input type="hidden" name="visible" value=(id);
            input type="checkbox" name=(format!("draft_{id}")) checked[*value];
        },
        other => render_cell(other),
    }
}

fn render_cell(cell: &AdminCell) -> Markup {
    match cell {
        AdminCell::Text(text) => html! { (text) },
        AdminCell::Link { text, href } => html! {
            a class="text-blue-600 hover:text-blue-800" href=(href) { (text) }
        },
        AdminCell::Bool(true) => html! { span class="text-green-600" { "✓" } },
        AdminCell::Bool(false) => html! { span class="text-gray-400" { "—" } },
        AdminCell::Thumb(src) => thumb(src),
        AdminCell::Empty => html! { span class="text-gray-400" { "—" } },
    }
}

/// Fixed-size preview used in lists and forms; display only.
fn thumb(src: &str) -> Markup {
    html! {
        @if src.is_empty() {
            span class="text-gray-400" { "—" }
        } @else {
            img class="rounded object-cover" src=(src) width="50" height="60";
        }
    }
}

fn filter_sidebar(config: &AdminConfig, filters: &[FilterGroup]) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-4" {
            h2 class="text-xs font-semibold uppercase tracking-wide text-gray-500" { "Filter" }
            @for group in filters {
                h3 class="mt-4 text-sm font-semibold text-gray-700" { (group.label) }
                ul class="mt-1 space-y-1 text-sm" {
                    li {
                        a class=(filter_link_class(group.active.is_none()))
                            href=(format!("/admin/{}", config.slug)) { "All" }
                    }
                    @for (value, label) in &group.options {
                        li {
                            a class=(filter_link_class(group.active.as_deref() == Some(value)))
                                href=(format!("/admin/{}?{}={}", config.slug, group.param, urlencoding::encode(value))) {
                                (label)
                            }
                        }
                    }
                }
            }
        }
    }
}

fn filter_link_class(active: bool) -> &'static str {
    if active { "font-semibold text-blue-700" } else { "text-blue-600 hover:text-blue-800" }
}

pub fn form_page(
    config: &AdminConfig,
    id: Option<i32>,
    form: &AdminForm,
    error: Option<&str>,
) -> String {
    let action = match id {
        Some(id) => format!("/admin/{}/{}", config.slug, id),
        None => format!("/admin/{}/new", config.slug),
    };
    let heading = match id {
        Some(id) => format!("{} #{id}", config.title),
        None => format!("New {}", config.title.to_lowercase()),
    };

    admin_page(
        &heading,
        html! {
            h1 class="text-2xl font-bold text-gray-900" { (heading) }

            @if let Some(error) = error {
                p class="mt-4 rounded-md bg-red-50 px-4 py-2 text-sm text-red-700" { (error) }
            }

            form class="mt-6 space-y-6" method="post" action=(action) {
                @if config.slug == "movie" {
                    @for fieldset in MOVIE_FIELDSETS {
                        (render_fieldset(fieldset, form))
                    }
                    @if id.is_some() {
                        (inline_shots(form))
                        (inline_reviews(form))
                    }
                } @else {
                    div class="bg-white shadow rounded-lg p-6 space-y-4" {
                        @for field in &form.fields {
                            (render_field(field))
                        }
                    }
                }

                div class="flex items-center gap-4" {
                    button class="rounded-md bg-blue-600 px-6 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Save" }
                    a class="text-sm text-gray-500 hover:text-gray-700" href=(format!("/admin/{}", config.slug)) { "Back to list" }
                }
            }

            @if let Some(id) = id {
                form class="mt-4" method="post" action=(format!("/admin/{}/{}/delete", config.slug, id))
                    onsubmit="return confirm('Delete this record?')" {
                    button class="text-sm text-red-600 hover:text-red-800" type="submit" { "Delete record" }
                }
            }
        },
    )
}

fn render_fieldset(fieldset: &Fieldset, form: &AdminForm) -> Markup {
    let body = html! {
        div class="space-y-4 p-6" {
            @for row in fieldset.rows {
                div class="flex flex-wrap gap-4" {
                    @for name in row.0 {
                        @if let Some(field) = form.field(name) {
                            div class="flex-1 min-w-48" { (render_field(field)) }
                        }
                    }
                }
            }
        }
    };

    html! {
        @if let Some(legend) = fieldset.legend {
            details class="bg-white shadow rounded-lg" open[!fieldset.collapsed] {
                summary class="cursor-pointer select-none px-6 py-3 font-semibold text-gray-700" { (legend) }
                (body)
            }
        } @else {
            div class="bg-white shadow rounded-lg" { (body) }
        }
    }
}

fn render_field(field: &FormField) -> Markup {
    let input_class = "mt-1 w-full rounded-md border border-gray-300 px-3 py-2 text-sm";
    html! {
        label class="block text-sm font-medium text-gray-700" {
            (field.label)
            @match &field.kind {
                FieldKind::Text(value) => {
                    input class=(input_class) name=(field.name) value=(value) disabled[field.readonly];
                }
                FieldKind::RichText(value) => {
                    // Authored as raw markup; the public page renders it verbatim.
                    textarea class=(format!("{input_class} font-mono")) name=(field.name) rows="10" { (value) }
                    span class="mt-1 block text-xs text-gray-400" { "HTML allowed" }
                }
                FieldKind::TextArea(value) => {
                    textarea class=(input_class) name=(field.name) rows="4" disabled[field.readonly] { (value) }
                }
                FieldKind::Number(value) => {
                    input class=(input_class) type="number" min="0" name=(field.name) value=(value) disabled[field.readonly];
                }
                FieldKind::Date(value) => {
                    input class=(input_class) type="date" name=(field.name) value=(value) disabled[field.readonly];
                }
                FieldKind::Checkbox(value) => {
                    div class="mt-1" {
                        input type="checkbox" name=(field.name) checked[*value] disabled[field.readonly];
                    }
                }
                FieldKind::Select { options, selected, allow_empty } => {
                    select class=(input_class) name=(field.name) disabled[field.readonly] {
                        @if *allow_empty {
                            option value="" selected[selected.is_none()] { "—" }
                        }
                        @for (value, label) in options {
                            option value=(value) selected[*selected == Some(*value)] { (label) }
                        }
                    }
                }
                FieldKind::MultiSelect { options, selected } => {
                    select class=(format!("{input_class} h-40")) name=(field.name) multiple {
                        @for (value, label) in options {
                            option value=(value) selected[selected.contains(value)] { (label) }
                        }
                    }
                }
                FieldKind::ImagePreview(value) => {
                    @if field.readonly {
                        div class="mt-1" { (thumb(value)) }
                    } @else {
                        input class=(input_class) name=(field.name) value=(value);
                        div class="mt-2" { (thumb(value)) }
                    }
                }
            }
        }
    }
}

fn inline_shots(form: &AdminForm) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6" {
            h2 class="font-semibold text-gray-700" { "Stills" }
            table class="mt-3 min-w-full text-sm" {
                thead class="text-left text-xs uppercase tracking-wide text-gray-500" {
                    tr {
                        th class="py-2 pr-4" { "Preview" }
                        th class="py-2 pr-4" { "Title" }
                        th class="py-2 pr-4" { "Description" }
                        th class="py-2 pr-4" { "Image" }
                        th class="py-2" { "Delete" }
                    }
                }
                tbody class="divide-y divide-gray-100" {
                    @for row in &form.shots {
                        tr {
                            td class="py-2 pr-4" {
                                @if let Some(src) = &row.thumb { (thumb(src)) }
                            }
                            @for (suffix, _, value, _) in &row.fields {
                                td class="py-2 pr-4" {
                                    input class="w-full rounded-md border border-gray-300 px-2 py-1"
                                        name=(format!("shot_{}_{}", row.id, suffix)) value=(value);
                                }
                            }
                            td class="py-2" {
                                input type="checkbox" name=(format!("shot_{}_delete", row.id));
                            }
                        }
                    }
                    @if form.blank_shot {
                        tr {
                            td class="py-2 pr-4 text-gray-400" { "new" }
                            @for suffix in ["title", "description", "image"] {
                                td class="py-2 pr-4" {
                                    input class="w-full rounded-md border border-gray-300 px-2 py-1"
                                        name=(format!("shot_new_{suffix}"));
                                }
                            }
                            td class="py-2" {}
                        }
                    }
                }
            }
        }
    }
}

fn inline_reviews(form: &AdminForm) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6" {
            h2 class="font-semibold text-gray-700" { "Reviews" }
            @if form.reviews.is_empty() {
                p class="mt-3 text-sm text-gray-500" { "No top-level reviews." }
            } @else {
                table class="mt-3 min-w-full text-sm" {
                    thead class="text-left text-xs uppercase tracking-wide text-gray-500" {
                        tr {
                            th class="py-2 pr-4" { "Name" }
                            th class="py-2 pr-4" { "Email" }
                            th class="py-2 pr-4" { "Text" }
                            th class="py-2" { "Delete" }
                        }
                    }
                    tbody class="divide-y divide-gray-100" {
                        @for row in &form.reviews {
                            tr {
                                @for (suffix, _, value, readonly) in &row.fields {
                                    td class="py-2 pr-4" {
                                        @if *readonly {
                                            // Author identity is never editable inline.
                                            span class="text-gray-700" { (value) }
                                        } @else {
                                            textarea class="w-full rounded-md border border-gray-300 px-2 py-1" rows="2"
                                                name=(format!("review_{}_{}", row.id, suffix)) { (value) }
                                        }
                                    }
                                }
                                td class="py-2" {
                                    input type="checkbox" name=(format!("review_{}_delete", row.id));
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn admin_page(title: &str, body: Markup) -> String {
    admin_shell(
        title,
        html! {
            div class="min-h-screen bg-gray-100" {
                header class="bg-gray-900 text-white" {
                    div class="max-w-6xl mx-auto flex items-center justify-between px-6 py-3" {
                        a class="font-bold" href="/admin" { "Kinoteka admin" }
                        div class="flex items-center gap-4 text-sm" {
                            a class="text-gray-300 hover:text-white" href="/" { "View site" }
                            form method="post" action="/admin/logout" {
                                button class="text-gray-300 hover:text-white" type="submit" { "Sign out" }
                            }
                        }
                    }
                }
                main class="max-w-6xl mx-auto px-6 py-8" { (body) }
            }
        },
    )
}

fn admin_shell(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · Kinoteka admin" }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}
