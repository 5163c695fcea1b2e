use shared::domain::{Contact, ContactStatus};
use storage::EntityStore;

use crate::contains_ignore_case;

/// Contacts whose name, email or company contains `search`, narrowed to `status`.
pub fn filter_contacts<'a>(
    store: &'a EntityStore,
    search: Option<&str>,
    status: Option<ContactStatus>,
) -> Vec<&'a Contact> {
    let search = search.filter(|s| !s.is_empty());
    store
        .contacts()
        .iter()
        .filter(|contact| {
            search.map_or(true, |s| {
                contains_ignore_case(&contact.name, s)
                    || contains_ignore_case(&contact.email, s)
                    || contains_ignore_case(&contact.company, s)
            })
        })
        .filter(|contact| status.map_or(true, |status| contact.status == status))
        .collect()
}

#[cfg(test)]
#[path = "tests/contacts_tests.rs"]
mod tests;
