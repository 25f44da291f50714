//! Declarative back-office configuration: one `AdminConfig` per entity,
//! interpreted by the generic list/form renderer in `templates`.

/// How one entity shows up in the back-office.
pub struct AdminConfig {
    pub slug: &'static str,
    pub title: &'static str,
    pub title_plural: &'static str,
    /// Columns of the list table, in order.
    pub list_display: &'static [&'static str],
    /// Subset of `list_display` rendered as links to the record.
    pub list_display_links: &'static [&'static str],
    /// Columns offered as filter groups next to the list.
    pub list_filter: &'static [&'static str],
    /// Columns the search box matches against.
    pub search_fields: &'static [&'static str],
    /// Columns editable directly from the list view.
    pub list_editable: &'static [&'static str],
    /// Fields shown but never editable on the record form.
    pub readonly_fields: &'static [&'static str],
    /// Bulk actions offered above the list.
    pub actions: &'static [AdminAction],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminAction {
    Publish,
    Unpublish,
}

impl AdminAction {
    pub fn key(self) -> &'static str {
        match self {
            AdminAction::Publish => "publish",
            AdminAction::Unpublish => "unpublish",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AdminAction::Publish => "Publish selected",
            AdminAction::Unpublish => "Unpublish selected",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "publish" => Some(AdminAction::Publish),
            "unpublish" => Some(AdminAction::Unpublish),
            _ => None,
        }
    }
}

pub const CATEGORY: AdminConfig = AdminConfig {
    slug: "category",
    title: "Category",
    title_plural: "Categories",
    list_display: &["id", "name", "url"],
    list_display_links: &["id", "name"],
    list_filter: &[],
    search_fields: &["name"],
    list_editable: &[],
    readonly_fields: &[],
    actions: &[],
};

pub const GENRE: AdminConfig = AdminConfig {
    slug: "genre",
    title: "Genre",
    title_plural: "Genres",
    list_display: &["id", "name", "description", "url"],
    list_display_links: &["id", "name"],
    list_filter: &[],
    search_fields: &["name"],
    list_editable: &[],
    readonly_fields: &[],
    actions: &[],
};

pub const ACTOR: AdminConfig = AdminConfig {
    slug: "actor",
    title: "Actor",
    title_plural: "Actors and directors",
    list_display: &["id", "name", "age", "image"],
    list_display_links: &["id", "name"],
    list_filter: &[],
    search_fields: &["name"],
    list_editable: &[],
    readonly_fields: &["image_preview"],
    actions: &[],
};

pub const MOVIE: AdminConfig = AdminConfig {
    slug: "movie",
    title: "Movie",
    title_plural: "Movies",
    list_display: &["id", "title", "category", "url", "draft", "poster"],
    list_display_links: &["id", "title"],
    list_filter: &["category", "year"],
    search_fields: &["title", "category"],
    list_editable: &["draft"],
    readonly_fields: &["poster_preview"],
    actions: &[AdminAction::Publish, AdminAction::Unpublish],
};

pub const MOVIE_SHOT: AdminConfig = AdminConfig {
    slug: "movie-shot",
    title: "Movie still",
    title_plural: "Movie stills",
    list_display: &["id", "title", "description", "movie", "image"],
    list_display_links: &["id", "title"],
    list_filter: &[],
    search_fields: &["title"],
    list_editable: &[],
    readonly_fields: &["image_preview"],
    actions: &[],
};

pub const RATING_STAR: AdminConfig = AdminConfig {
    slug: "rating-star",
    title: "Rating star",
    title_plural: "Rating stars",
    list_display: &["id", "value"],
    list_display_links: &["id", "value"],
    list_filter: &[],
    search_fields: &[],
    list_editable: &[],
    readonly_fields: &[],
    actions: &[],
};

pub const RATING: AdminConfig = AdminConfig {
    slug: "rating",
    title: "Rating",
    title_plural: "Ratings",
    list_display: &["id", "ip", "star", "movie"],
    list_display_links: &["id", "ip"],
    list_filter: &[],
    search_fields: &["ip"],
    list_editable: &[],
    readonly_fields: &[],
    actions: &[],
};

pub const REVIEW: AdminConfig = AdminConfig {
    slug: "review",
    title: "Review",
    title_plural: "Reviews",
    list_display: &["id", "name", "parent", "movie"],
    list_display_links: &["id", "name"],
    list_filter: &[],
    search_fields: &["name", "email"],
    list_editable: &[],
    // Author identity is never editable; moderation is delete-only.
    readonly_fields: &["name", "email"],
    actions: &[],
};

pub const REGISTRY: &[&AdminConfig] =
    &[&CATEGORY, &GENRE, &ACTOR, &MOVIE, &MOVIE_SHOT, &RATING_STAR, &RATING, &REVIEW];

pub fn config_for(slug: &str) -> Option<&'static AdminConfig> {
    REGISTRY.iter().copied().find(|c| c.slug == slug)
}

/// One row of fields rendered side by side on the record form.
pub struct FieldRow(pub &'static [&'static str]);

/// A group of form rows, optionally collapsible.
pub struct Fieldset {
    pub legend: Option<&'static str>,
    pub collapsed: bool,
    pub rows: &'static [FieldRow],
}

/// Grouped layout of the movie form. Other entities render their fields as
/// one flat group.
pub const MOVIE_FIELDSETS: &[Fieldset] = &[
    Fieldset { legend: None, collapsed: false, rows: &[FieldRow(&["title", "tagline"])] },
    Fieldset {
        legend: None,
        collapsed: false,
        rows: &[FieldRow(&["description"]), FieldRow(&["poster", "poster_preview"])],
    },
    Fieldset {
        legend: None,
        collapsed: false,
        rows: &[FieldRow(&["year", "world_premiere", "country"])],
    },
    Fieldset {
        legend: Some("Relations"),
        collapsed: true,
        rows: &[FieldRow(&["actors", "directors", "genres", "category"])],
    },
    Fieldset {
        legend: None,
        collapsed: false,
        rows: &[FieldRow(&["budget", "fees_in_usa", "fees_in_world"])],
    },
    Fieldset { legend: Some("Options"), collapsed: false, rows: &[FieldRow(&["url", "draft"])] },
];

/// Operator-facing result line for a bulk update.
pub fn updated_phrase(rows: u64) -> String {
    if rows == 1 { "1 record updated".to_string() } else { format!("{rows} records updated") }
}
