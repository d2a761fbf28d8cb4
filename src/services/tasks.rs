use uuid::Uuid;

use crate::auth::{authority::Role, ensure_owner_or_superuser};
use crate::error::AppError;
use crate::models::{Page, Task, TaskCreate, TaskUpdate, TasksPublic, User};
use crate::store::{Session, TaskScope};

/// Task CRUD scoped by ownership: members see and change their own tasks,
/// superusers all of them.
pub struct TaskRegistry<'a> {
    session: &'a mut dyn Session,
}

fn scope_for(user: &User) -> TaskScope {
    match user.role() {
        Role::Admin => TaskScope::All,
        Role::Member => TaskScope::OwnedBy(user.id),
    }
}

impl<'a> TaskRegistry<'a> {
    pub fn new(session: &'a mut dyn Session) -> Self {
        Self { session }
    }

    /// `count` is the size of the caller's scope, not of the page.
    pub async fn list(&mut self, current_user: &User, page: Page) -> Result<TasksPublic, AppError> {
        let scope = scope_for(current_user);
        let count = self.session.count_tasks(scope).await?;
        let data = self.session.select_tasks(scope, page).await?;
        Ok(TasksPublic { data, count })
    }

    /// Existence is checked before authority: a stranger's task is 403, a
    /// missing one 404.
    pub async fn get_by_id(&mut self, id: Uuid, current_user: &User) -> Result<Task, AppError> {
        let task = self
            .session
            .get_task(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
        ensure_owner_or_superuser(current_user, task.owner_id)?;
        Ok(task)
    }

    pub async fn create(&mut self, data: TaskCreate, current_user: &User) -> Result<Task, AppError> {
        let task = self
            .session
            .insert_task(&Task::new(data, current_user.id))
            .await?;
        self.session.commit().await?;
        log::info!("user {} created task {}", current_user.id, task.id);
        Ok(task)
    }

    pub async fn update(
        &mut self,
        id: Uuid,
        patch: TaskUpdate,
        current_user: &User,
    ) -> Result<Task, AppError> {
        let mut task = self.get_by_id(id, current_user).await?;
        task.apply(patch);
        let task = self.session.update_task(&task).await?;
        self.session.commit().await?;
        Ok(task)
    }

    pub async fn delete(&mut self, id: Uuid, current_user: &User) -> Result<(), AppError> {
        let task = self.get_by_id(id, current_user).await?;
        self.session.delete_task(task.id).await?;
        self.session.commit().await?;
        log::info!("user {} deleted task {}", current_user.id, task.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskStatus, UserCreate};
    use crate::store::{MemoryStore, Store};
    use pretty_assertions::assert_eq;

    async fn stored_user(store: &MemoryStore, email: &str, is_superuser: bool) -> User {
        let input = UserCreate {
            email: email.into(),
            password: "longenough1".into(),
            is_active: true,
            is_superuser,
            full_name: None,
        };
        let mut session = store.begin().await.unwrap();
        let user = session
            .insert_user(&User::new(email.into(), "hash".into(), &input))
            .await
            .unwrap();
        session.commit().await.unwrap();
        user
    }

    fn new_task(title: &str) -> TaskCreate {
        TaskCreate {
            title: title.into(),
            description: Some("details".into()),
            status: TaskStatus::Pending,
        }
    }

    struct Fixture {
        store: MemoryStore,
        owner: User,
        stranger: User,
        admin: User,
        task: Task,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let owner = stored_user(&store, "owner@example.com", false).await;
        let stranger = stored_user(&store, "stranger@example.com", false).await;
        let admin = stored_user(&store, "admin@example.com", true).await;

        let mut session = store.begin().await.unwrap();
        let task = TaskRegistry::new(session.as_mut())
            .create(new_task("owned"), &owner)
            .await
            .unwrap();
        drop(session);

        Fixture {
            store,
            owner,
            stranger,
            admin,
            task,
        }
    }

    #[actix_rt::test]
    async fn test_create_forces_owner() {
        let f = fixture().await;
        assert_eq!(f.task.owner_id, f.owner.id);
        assert_eq!(f.task.status, TaskStatus::Pending);
    }

    #[actix_rt::test]
    async fn test_list_is_scoped_by_role() {
        let f = fixture().await;
        let mut session = f.store.begin().await.unwrap();
        let mut tasks = TaskRegistry::new(session.as_mut());
        tasks.create(new_task("theirs"), &f.stranger).await.unwrap();
        tasks.create(new_task("theirs too"), &f.stranger).await.unwrap();

        let owner_view = tasks.list(&f.owner, Page::default()).await.unwrap();
        assert_eq!(owner_view.count, 1);
        assert_eq!(owner_view.data[0].id, f.task.id);

        let stranger_view = tasks.list(&f.stranger, Page::new(0, 1).unwrap()).await.unwrap();
        assert_eq!(stranger_view.count, 2);
        assert_eq!(stranger_view.data.len(), 1);

        let admin_view = tasks.list(&f.admin, Page::default()).await.unwrap();
        assert_eq!(admin_view.count, 3);
    }

    #[actix_rt::test]
    async fn test_stranger_is_forbidden_everywhere() {
        let f = fixture().await;
        let mut session = f.store.begin().await.unwrap();
        let mut tasks = TaskRegistry::new(session.as_mut());

        assert!(matches!(
            tasks.get_by_id(f.task.id, &f.stranger).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            tasks
                .update(f.task.id, TaskUpdate::default(), &f.stranger)
                .await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            tasks.delete(f.task.id, &f.stranger).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(tasks.get_by_id(f.task.id, &f.owner).await.is_ok());
    }

    #[actix_rt::test]
    async fn test_missing_task_is_not_found() {
        let f = fixture().await;
        let mut session = f.store.begin().await.unwrap();
        let mut tasks = TaskRegistry::new(session.as_mut());
        let missing = Uuid::new_v4();

        assert!(matches!(
            tasks.get_by_id(missing, &f.admin).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            tasks.delete(missing, &f.stranger).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_owner_and_admin_can_update_and_delete() {
        let f = fixture().await;
        let mut session = f.store.begin().await.unwrap();
        let mut tasks = TaskRegistry::new(session.as_mut());

        let patch = TaskUpdate {
            status: Some(TaskStatus::InProgress),
            ..TaskUpdate::default()
        };
        let updated = tasks.update(f.task.id, patch, &f.owner).await.unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.title, "owned");
        assert_eq!(updated.description.as_deref(), Some("details"));

        let patch = TaskUpdate {
            title: Some("renamed by admin".into()),
            description: Some(None),
            status: None,
        };
        let updated = tasks.update(f.task.id, patch, &f.admin).await.unwrap();
        assert_eq!(updated.title, "renamed by admin");
        assert_eq!(updated.description, None);
        assert_eq!(updated.owner_id, f.owner.id);

        tasks.delete(f.task.id, &f.admin).await.unwrap();
        assert!(matches!(
            tasks.get_by_id(f.task.id, &f.owner).await,
            Err(AppError::NotFound(_))
        ));
    }
}
