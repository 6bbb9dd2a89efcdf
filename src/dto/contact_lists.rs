use serde::Serialize;

use crate::domain::contact_list::ContactList;

/// Saved list with the size of the segment it currently matches.
#[derive(Debug, Serialize)]
pub struct ContactListView {
    #[serde(flatten)]
    pub list: ContactList,
    pub contact_count: usize,
    /// Matching contacts a campaign would actually reach.
    pub active_count: usize,
}
