use dashboard_client::NewPost;
use validator::{Validate, ValidationErrors};

use crate::entity::PostPatch;

#[derive(Debug, Clone, Validate)]
/// Форма создания/редактирования поста.
pub struct PostForm {
    #[validate(range(min = 1, message = "Author is required"))]
    pub user_id: i64,
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: String,
    #[validate(length(min = 10, message = "Content must be at least 10 characters"))]
    pub body: String,
}

impl PostForm {
    /// Создаёт форму с обрезанными по краям полями.
    pub fn new(user_id: i64, title: &str, body: &str) -> Self {
        Self {
            user_id,
            title: title.trim().to_string(),
            body: body.trim().to_string(),
        }
    }

    pub fn into_draft(self) -> Result<NewPost, ValidationErrors> {
        self.validate()?;
        Ok(NewPost {
            user_id: self.user_id,
            title: self.title,
            body: self.body,
        })
    }

    pub fn into_patch(self) -> Result<PostPatch, ValidationErrors> {
        self.validate()?;
        Ok(PostPatch {
            user_id: Some(self.user_id),
            title: Some(self.title),
            body: Some(self.body),
        })
    }
}
