/// Builds admin URLs from route paths such as
/// `admin/questiongroups/sa/edit/surveyid/1/gid/2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    base_url: String,
}

impl UrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn create_url(&self, route: &str) -> String {
        let route = route.trim_matches('/');
        if route.is_empty() {
            return format!("{}/", self.base_url);
        }
        format!("{}/{}", self.base_url, route)
    }

    /// Route for a group-scoped admin action
    pub fn group_action(&self, controller: &str, action: &str, sid: i32, gid: i32) -> String {
        self.create_url(&format!(
            "admin/{}/sa/{}/surveyid/{}/gid/{}",
            controller, action, sid, gid
        ))
    }
}

impl Default for UrlBuilder {
    fn default() -> Self {
        Self::new("/index.php")
    }
}
