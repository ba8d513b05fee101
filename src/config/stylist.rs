use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Stylist {
    pub email: String,
    /// Folder name under the sync root when it differs from the stylist's
    /// display name.
    #[serde(default)]
    pub folder: Option<String>,
}

impl Stylist {
    pub fn folder_name<'a>(&'a self, stylist_name: &'a str) -> &'a str {
        self.folder.as_deref().unwrap_or(stylist_name)
    }
}
