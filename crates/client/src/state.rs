// Session states and the route guard
//
//   Unknown ──mount──▶ Checking ──refresh ok──▶ Authenticated(user)
//                          └──────refresh failed──▶ Anonymous
//
// The guard is a pure function of (state, path, route table).

use taskvilla_domain::Role;

use crate::http::ClientUser;
use crate::routes::{RouteTable, Visibility};

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing known yet (before mount)
    #[default]
    Unknown,
    /// Refresh request in flight
    Checking,
    Authenticated(ClientUser),
    Anonymous,
}

impl SessionState {
    pub fn user(&self) -> Option<&ClientUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Where a signed-in user lands after login or when bounced off a page
pub fn landing_path(role: &str) -> &'static str {
    match role.parse::<Role>() {
        Ok(Role::Client) => "/client/dashboard",
        Ok(Role::Freelancer) => "/freelancer/dashboard",
        Ok(Role::Admin) => "/admin/users",
        Err(_) => "/dashboard",
    }
}

/// Redirect target for `path` in `state`, if any
pub fn redirect_for(state: &SessionState, path: &str, table: &RouteTable) -> Option<String> {
    match state {
        SessionState::Unknown | SessionState::Checking => None,
        SessionState::Anonymous => match table.visibility(path) {
            Visibility::Public | Visibility::GuestOnly => None,
            Visibility::AuthOnly | Visibility::RoleRestricted(_) => Some(LOGIN_PATH.to_string()),
        },
        SessionState::Authenticated(user) => {
            let landing = landing_path(&user.role);
            let bounce = match table.visibility(path) {
                Visibility::GuestOnly => true,
                Visibility::RoleRestricted(roles) => {
                    !user.role().is_some_and(|role| roles.contains(&role))
                }
                Visibility::Public | Visibility::AuthOnly => false,
            };
            // Never redirect a page onto itself
            (bounce && !same_path(landing, path)).then(|| landing.to_string())
        }
    }
}

fn same_path(a: &str, b: &str) -> bool {
    let normalize = |p: &str| {
        p.split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string()
    };
    normalize(a) == normalize(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: &str) -> SessionState {
        SessionState::Authenticated(ClientUser {
            id: Uuid::nil(),
            email: "u@example.com".to_string(),
            name: "U".to_string(),
            role: role.to_string(),
            email_verified: true,
        })
    }

    #[test]
    fn test_landing_paths() {
        assert_eq!(landing_path("CLIENT"), "/client/dashboard");
        assert_eq!(landing_path("FREELANCER"), "/freelancer/dashboard");
        assert_eq!(landing_path("ADMIN"), "/admin/users");
        assert_eq!(landing_path("MODERATOR"), "/dashboard");
    }

    #[test]
    fn test_pending_states_never_redirect() {
        let table = RouteTable::marketplace();
        for state in [SessionState::Unknown, SessionState::Checking] {
            assert_eq!(redirect_for(&state, "/admin/users", &table), None);
            assert_eq!(redirect_for(&state, "/login", &table), None);
        }
    }

    #[test]
    fn test_anonymous_redirects_to_login() {
        let table = RouteTable::marketplace();
        let state = SessionState::Anonymous;
        assert_eq!(
            redirect_for(&state, "/client/dashboard", &table).as_deref(),
            Some("/login")
        );
        assert_eq!(
            redirect_for(&state, "/bookings", &table).as_deref(),
            Some("/login")
        );
        assert_eq!(redirect_for(&state, "/villas/3", &table), None);
        assert_eq!(redirect_for(&state, "/login", &table), None);
    }

    #[test]
    fn test_signed_in_users_leave_auth_pages() {
        let table = RouteTable::marketplace();
        assert_eq!(
            redirect_for(&user("FREELANCER"), "/login", &table).as_deref(),
            Some("/freelancer/dashboard")
        );
        assert_eq!(
            redirect_for(&user("CLIENT"), "/register", &table).as_deref(),
            Some("/client/dashboard")
        );
        assert_eq!(
            redirect_for(&user("MODERATOR"), "/login", &table).as_deref(),
            Some("/dashboard")
        );
        assert_eq!(redirect_for(&user("CLIENT"), "/villas", &table), None);
    }

    #[test]
    fn test_role_restricted_pages() {
        let table = RouteTable::marketplace();
        assert_eq!(
            redirect_for(&user("CLIENT"), "/admin/users", &table).as_deref(),
            Some("/client/dashboard")
        );
        assert_eq!(redirect_for(&user("ADMIN"), "/admin/users", &table), None);
        assert_eq!(
            redirect_for(&user("FREELANCER"), "/freelancer/earnings", &table),
            None
        );
    }

    #[test]
    fn test_unknown_role_is_not_looped() {
        // "/dashboard" is the unknown-role landing page; being bounced from a
        // restricted page must not redirect again once there
        let table = RouteTable::new().route("/dashboard", Visibility::RoleRestricted(vec![]));
        assert_eq!(redirect_for(&user("MODERATOR"), "/dashboard", &table), None);
    }
}
