use crate::models::{User, UserResponse};

pub fn to_user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        full_name: user.full_name.clone(),
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
        }
    }
}
