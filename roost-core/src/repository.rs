use async_trait::async_trait;
use uuid::Uuid;

use crate::identity::Student;
use crate::CoreResult;

/// Repository trait for student records. Email lookups are expected to be
/// case-insensitive at the call site (emails are stored lowercased).
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn insert(&self, student: Student) -> CoreResult<Student>;

    async fn find(&self, id: Uuid) -> CoreResult<Option<Student>>;

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<Student>>;

    async fn update(&self, student: Student) -> CoreResult<Student>;
}
