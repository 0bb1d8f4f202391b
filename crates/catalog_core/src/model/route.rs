//! Detail locators consumed by the URL routing layer.
//!
//! # Responsibility
//! - Own the route names and path shapes of every detail view.
//! - Resolve a route name plus record id into a canonical path.
//!
//! # Invariants
//! - Route names are stable strings shared with the router configuration.
//! - Paths always end with the hyphenated record uuid.

use uuid::Uuid;

/// Named detail routes exposed to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailRoute {
    GenreDetail,
    BookDetails,
    Author,
}

impl DetailRoute {
    pub const ALL: [DetailRoute; 3] = [
        DetailRoute::GenreDetail,
        DetailRoute::BookDetails,
        DetailRoute::Author,
    ];

    /// Route name registered with the router.
    pub fn name(self) -> &'static str {
        match self {
            Self::GenreDetail => "genre-detail",
            Self::BookDetails => "book-details",
            Self::Author => "author",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::GenreDetail => "/genre/",
            Self::BookDetails => "/book/",
            Self::Author => "/author/",
        }
    }

    /// Builds the detail path for one record.
    pub fn path(self, id: Uuid) -> String {
        format!("{}{}", self.prefix(), id.hyphenated())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.name() == name)
    }
}

/// Resolves a route name into a detail path, `None` for unknown names.
pub fn reverse(route_name: &str, id: Uuid) -> Option<String> {
    DetailRoute::from_name(route_name).map(|route| route.path(id))
}

/// Record that has a canonical detail page.
pub trait DetailLocator {
    const ROUTE: DetailRoute;

    fn locator_id(&self) -> Uuid;

    fn absolute_url(&self) -> String {
        Self::ROUTE.path(self.locator_id())
    }
}

#[cfg(test)]
mod tests {
    use super::{reverse, DetailRoute};
    use uuid::Uuid;

    #[test]
    fn reverse_resolves_known_route_names() {
        let id = Uuid::parse_str("6f1c2d3e-4a5b-4c6d-8e7f-001122334455").unwrap();
        assert_eq!(
            reverse("genre-detail", id).as_deref(),
            Some("/genre/6f1c2d3e-4a5b-4c6d-8e7f-001122334455")
        );
        assert_eq!(
            reverse("book-details", id).as_deref(),
            Some("/book/6f1c2d3e-4a5b-4c6d-8e7f-001122334455")
        );
        assert_eq!(
            reverse("author", id).as_deref(),
            Some("/author/6f1c2d3e-4a5b-4c6d-8e7f-001122334455")
        );
    }

    #[test]
    fn reverse_rejects_unknown_route_names() {
        assert_eq!(reverse("book-detail", Uuid::new_v4()), None);
        assert_eq!(DetailRoute::from_name(""), None);
    }
}
