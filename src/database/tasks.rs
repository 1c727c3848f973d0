use super::{Record, Result, Store};
use crate::model::{Account, NewTask, Task};

impl Store {
    crate::query! {
        /// Ordered by priority ordinal descending, then due date ascending.
        pub fn list_tasks(account: &Record<Account>, include_completed: bool) -> Vec<Task>
            where "SELECT * FROM tasks WHERE account = $account AND ($include_completed OR completed = false) ORDER BY priority DESC, due_date ASC"
    }

    crate::query! {
        /// Returns the updated task, or `None` if no such task exists.
        pub fn set_task_completed(task: &Record<Task>, completed: bool) -> Option<Task>
            where "UPDATE tasks SET completed = $completed WHERE id = $task RETURN AFTER"
    }

    pub async fn create_task(&self, account: &Record<Account>, task: NewTask) -> Result<Task> {
        self.insert(&Task::from_new(account.clone(), task)).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::Priority;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    async fn seeded() -> (Store, Record<Account>, Vec<Task>) {
        let store = Store::memory().await.unwrap();
        let account = store.register_account("ayame", "oni-sword").await.unwrap().id;

        let mut created = Vec::new();
        for (title, day, priority) in [
            ("edit thumbnail", 12, Priority::High),
            ("reply to comments", 3, Priority::Low),
            ("record intro", 5, Priority::Medium),
            ("plan collab", 1, Priority::High),
        ] {
            let task = NewTask::new(title.into(), None, date(day), priority);
            created.push(store.create_task(&account, task).await.unwrap());
        }

        (store, account, created)
    }

    #[tokio::test]
    async fn tasks_are_ordered_by_priority_then_due_date() {
        let (store, account, _) = seeded().await;

        let tasks = store.list_tasks(&account, false).await.unwrap();
        let titles: Vec<&str> = tasks.iter().map(|task| task.title.as_str()).collect();
        assert_eq!(
            titles,
            ["reply to comments", "record intro", "plan collab", "edit thumbnail"]
        );
    }

    #[tokio::test]
    async fn completed_tasks_are_hidden_unless_requested() {
        let (store, account, created) = seeded().await;

        let done = store
            .set_task_completed(&created[0].id, true)
            .await
            .unwrap()
            .expect("task exists");
        assert!(done.completed);

        let open = store.list_tasks(&account, false).await.unwrap();
        assert_eq!(open.len(), 3);
        assert!(open.iter().all(|task| !task.completed));

        let all = store.list_tasks(&account, true).await.unwrap();
        assert_eq!(all.len(), 4);

        store.set_task_completed(&created[0].id, false).await.unwrap();
        assert_eq!(store.list_tasks(&account, false).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn completing_a_missing_task_returns_none() {
        let (store, _, _) = seeded().await;
        let missing = Record::<Task>::uuid();
        assert_eq!(store.set_task_completed(&missing, true).await.unwrap(), None);
    }

    #[tokio::test]
    async fn task_fields_survive_storage() {
        let (store, account, _) = seeded().await;
        let task = NewTask::new(
            "upload vlog".into(),
            Some("cut the boring parts".into()),
            date(20),
            Priority::Medium,
        );
        let created = store.create_task(&account, task).await.unwrap();

        let listed = store.list_tasks(&account, true).await.unwrap();
        let found = listed
            .iter()
            .find(|task| task.id == created.id)
            .expect("created task is listed");
        assert_eq!(found.description.as_deref(), Some("cut the boring parts"));
        assert_eq!(found.due_date, date(20));
        assert_eq!(found.priority, Priority::Medium);
        assert!(!found.completed);
    }
}
