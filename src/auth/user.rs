use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

// Identity is asserted by the gateway in front of this service; roles are
// derived from the email allowlists at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
}

impl User {
    pub fn guest() -> Self {
        Self {
            id: Uuid::new_v4(),
            email: "".into(),
            roles: vec![],
        }
    }

    pub fn identified(id: Uuid, email: String) -> Self {
        let email = email.trim().to_ascii_lowercase();

        let mut roles = vec![];
        if config::can_access_admin_panel(&email) {
            roles.push("admin".into());
        }

        Self { id, email, roles }
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin".into())
    }

    fn has_role(&self, role: String) -> bool {
        self.roles.iter().find(|&x| x == &role).is_some()
    }
}

impl PolarClass for User {
    fn get_polar_class_builder() -> oso::ClassBuilder<User> {
        oso::Class::builder()
            .name("User")
            .add_attribute_getter("id", |recv: &User| recv.id.clone())
            .add_attribute_getter("email", |recv: &User| recv.email.clone())
            .add_attribute_getter("roles", |recv: &User| recv.roles.clone())
            .add_method("has_role", User::has_role)
    }

    fn get_polar_class() -> oso::Class {
        let builder = User::get_polar_class_builder();
        builder.build()
    }
}
