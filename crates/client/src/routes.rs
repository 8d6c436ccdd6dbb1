// Declarative route classification
// Decision: Paths not listed in the table need a session

use taskvilla_domain::Role;

/// Who may see a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Anyone
    Public,
    /// Login and registration pages; signed-in users are sent to their landing page
    GuestOnly,
    /// Any signed-in user
    AuthOnly,
    /// Signed-in users with one of these roles
    RoleRestricted(Vec<Role>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `:name`, matches any single non-empty segment
    Param,
    /// Trailing `*`, matches the rest of the path (including nothing)
    Rest,
}

/// Path pattern such as `/villas/:id` or `/admin/*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split(['?', '#'])
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split(pattern)
            .map(|segment| {
                if segment == "*" {
                    Segment::Rest
                } else if segment.starts_with(':') {
                    Segment::Param
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();
        Self { segments }
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split(path).collect();
        let mut parts = parts.iter();

        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Param => {
                    if parts.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(literal) => match parts.next() {
                    Some(part) if *part == literal.as_str() => {}
                    _ => return false,
                },
            }
        }
        parts.next().is_none()
    }
}

/// Ordered pattern table; the first match wins
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<(RoutePattern, Visibility)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: &str, visibility: Visibility) -> Self {
        self.routes.push((RoutePattern::parse(pattern), visibility));
        self
    }

    pub fn visibility(&self, path: &str) -> Visibility {
        self.routes
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, visibility)| visibility.clone())
            .unwrap_or(Visibility::AuthOnly)
    }

    /// Route table of the Taskvilla web frontend
    pub fn marketplace() -> Self {
        Self::new()
            .route("/", Visibility::Public)
            .route("/login", Visibility::GuestOnly)
            .route("/register", Visibility::GuestOnly)
            .route("/forgot-password", Visibility::GuestOnly)
            .route("/reset-password", Visibility::Public)
            .route("/verify-email", Visibility::Public)
            .route("/villas", Visibility::Public)
            .route("/villas/:id", Visibility::Public)
            .route("/tasks", Visibility::Public)
            .route("/tasks/:id", Visibility::Public)
            .route("/client/*", Visibility::RoleRestricted(vec![Role::Client]))
            .route(
                "/freelancer/*",
                Visibility::RoleRestricted(vec![Role::Freelancer]),
            )
            .route("/admin/*", Visibility::RoleRestricted(vec![Role::Admin]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_and_param_segments() {
        let pattern = RoutePattern::parse("/villas/:id");
        assert!(pattern.matches("/villas/42"));
        assert!(pattern.matches("/villas/42/"));
        assert!(pattern.matches("/villas/42?dates=2025-07"));
        assert!(!pattern.matches("/villas"));
        assert!(!pattern.matches("/villas/42/book"));
        assert!(!pattern.matches("/tasks/42"));
    }

    #[test]
    fn test_rest_segment() {
        let pattern = RoutePattern::parse("/admin/*");
        assert!(pattern.matches("/admin"));
        assert!(pattern.matches("/admin/users"));
        assert!(pattern.matches("/admin/users/7/edit"));
        assert!(!pattern.matches("/administrator"));
    }

    #[test]
    fn test_root() {
        let pattern = RoutePattern::parse("/");
        assert!(pattern.matches("/"));
        assert!(pattern.matches(""));
        assert!(!pattern.matches("/login"));
    }

    #[test]
    fn test_unmatched_paths_need_a_session() {
        let table = RouteTable::marketplace();
        assert_eq!(table.visibility("/bookings/9"), Visibility::AuthOnly);
        assert_eq!(table.visibility("/villas/9"), Visibility::Public);
        assert_eq!(table.visibility("/login"), Visibility::GuestOnly);
        assert_eq!(
            table.visibility("/freelancer/dashboard"),
            Visibility::RoleRestricted(vec![Role::Freelancer])
        );
    }

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::new()
            .route("/tasks/new", Visibility::AuthOnly)
            .route("/tasks/:id", Visibility::Public);
        assert_eq!(table.visibility("/tasks/new"), Visibility::AuthOnly);
        assert_eq!(table.visibility("/tasks/17"), Visibility::Public);
    }
}
