use std::env;

// Comma-separated email allowlists, read from the environment at call time.
fn email_list(var: &str) -> Vec<String> {
    env::var(var)
        .map(|raw| {
            raw.split(',')
                .map(|entry| entry.trim().to_ascii_lowercase())
                .filter(|entry| !entry.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

pub fn super_admin_emails() -> Vec<String> {
    email_list("SUPER_ADMIN_EMAILS")
}

pub fn admin_panel_emails() -> Vec<String> {
    email_list("ADMIN_PANEL_EMAILS")
}

// super admins bypass the access approval workflow entirely
pub fn is_super_admin(email: &str) -> bool {
    let email = email.trim().to_ascii_lowercase();
    super_admin_emails().iter().any(|entry| entry == &email)
}

pub fn can_access_admin_panel(email: &str) -> bool {
    let email = email.trim().to_ascii_lowercase();
    is_super_admin(&email) || admin_panel_emails().iter().any(|entry| entry == &email)
}
