// src/service_tests.rs

#[cfg(test)]
mod tests {
    use crate::csv_import::parse_shifts_csv;
    use crate::leave::{LeaveDraft, LeaveService, LeaveStatus, LeaveType};
    use crate::model::{ShiftDraft, ShiftStatus, UserProfile};
    use crate::notify::{LogNotifier, Notification, Notifier, NotifyError};
    use crate::shift_service::ShiftService;
    use crate::store::{MemoryStore, ShiftStore};
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn draft(date: &str, start: (u32, u32), end: (u32, u32)) -> ShiftDraft {
        ShiftDraft {
            date: d(date),
            start_time: t(start.0, start.1),
            end_time: t(end.0, end.1),
            notes: None,
            status: ShiftStatus::Pending,
        }
    }

    /// Transport that always fails, to prove delivery is best effort.
    #[derive(Default)]
    struct FailingNotifier {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _user_id: &str, _n: &Notification) -> Result<(), NotifyError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(NotifyError("transport down".to_string()))
        }
    }

    fn service(store: Arc<MemoryStore>) -> ShiftService {
        ShiftService::new(store, Arc::new(LogNotifier))
    }

    #[tokio::test]
    async fn add_shift_mirrors_onto_the_shared_calendar() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let shift = svc
            .add_shift("u1", draft("2025-06-02", (9, 0), (17, 0)))
            .await
            .unwrap();
        assert_eq!(shift.user_id, "u1");

        assert_eq!(store.shifts_for_user("u1").await.unwrap().len(), 1);
        let shared = store.shared_shifts_for_user("u1").await.unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].date, d("2025-06-02"));
        assert_eq!(shared[0].created_by_user_id, "u1");
    }

    #[tokio::test]
    async fn add_shift_succeeds_when_the_mirror_write_is_denied() {
        let store = Arc::new(MemoryStore::new());
        store.deny_shared_writes(true);
        let svc = service(store.clone());

        let shift = svc
            .add_shift("u1", draft("2025-06-02", (9, 0), (17, 0)))
            .await
            .unwrap();
        assert_eq!(shift.user_id, "u1");

        assert_eq!(store.shifts_for_user("u1").await.unwrap().len(), 1);
        assert!(store.shared_shifts_for_user("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn assign_shift_records_the_change() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let shift = svc
            .assign_shift("admin", "u1", draft("2025-06-02", (9, 0), (17, 0)))
            .await
            .unwrap();
        assert_eq!(shift.assigned_to_user_id, "u1");
        assert_eq!(shift.created_by_user_id, "admin");

        let log = store.change_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].user_id, "admin");
        assert_eq!(log[0].action, "add");
        assert!(log[0].details.contains("u1"));
    }

    #[tokio::test]
    async fn assignment_survives_a_broken_notification_transport() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(FailingNotifier::default());
        let svc = ShiftService::new(store.clone(), notifier.clone());

        let result = svc
            .assign_shift("admin", "u1", draft("2025-06-02", (9, 0), (17, 0)))
            .await;
        assert!(result.is_ok());
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(store.shared_shifts_for_user("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn set_status_and_delete_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let shift = store.seed_shift("u1", draft("2025-06-02", (9, 0), (17, 0)));
        let updated = svc.set_status(&shift.id, ShiftStatus::Paid).await.unwrap();
        assert_eq!(updated.status, ShiftStatus::Paid);

        svc.delete_shift(&shift.id).await.unwrap();
        assert!(store.shifts_for_user("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_shared_shift_is_logged() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let shift = store.seed_shared_shift("u1", draft("2025-06-02", (9, 0), (17, 0)));
        svc.delete_shared_shift("admin", &shift.id).await.unwrap();

        assert!(store.shared_shifts_for_user("u1").await.unwrap().is_empty());
        let log = store.change_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, "delete");
    }

    #[tokio::test]
    async fn import_commits_only_matched_rows() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let users = vec![UserProfile {
            id: "u1".to_string(),
            username: "mrossi".to_string(),
            full_name: Some("Mario Rossi".to_string()),
        }];
        let content = "mrossi,25/12/2024,09:00,17:00\n\
                       Nessuno Noto,26/12/2024,09:00,17:00";
        let report = parse_shifts_csv(content, &users);
        assert_eq!(report.shifts.len(), 2);

        let imported = svc.import_parsed_rows("admin", &report.shifts).await.unwrap();
        assert_eq!(imported, 1);

        let shared = store.shared_shifts_for_user("u1").await.unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].created_by_user_id, "admin");

        let log = store.change_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, "import");
        assert!(log[0].details.contains('1'));
    }

    #[tokio::test]
    async fn importing_nothing_leaves_no_log_entry() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let imported = svc.import_parsed_rows("admin", &[]).await.unwrap();
        assert_eq!(imported, 0);
        assert!(store.change_log().is_empty());
    }

    #[tokio::test]
    async fn leave_submission_rejects_backwards_ranges() {
        let store = Arc::new(MemoryStore::new());
        let svc = LeaveService::new(store, Arc::new(LogNotifier));

        let result = svc
            .submit(
                "u1",
                LeaveDraft {
                    request_type: LeaveType::Vacation,
                    start_date: d("2025-07-10"),
                    end_date: d("2025-07-05"),
                    reason: None,
                },
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn leave_review_records_the_decision() {
        let store = Arc::new(MemoryStore::new());
        let svc = LeaveService::new(store.clone(), Arc::new(LogNotifier));

        let request = svc
            .submit(
                "u1",
                LeaveDraft {
                    request_type: LeaveType::Sick,
                    start_date: d("2025-07-05"),
                    end_date: d("2025-07-07"),
                    reason: Some("flu".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(request.status, LeaveStatus::Pending);

        let reviewed = svc
            .review("admin", &request.id, false, Some("short notice".to_string()))
            .await
            .unwrap();
        assert_eq!(reviewed.status, LeaveStatus::Rejected);
        assert_eq!(reviewed.reviewed_by_user_id.as_deref(), Some("admin"));
        assert_eq!(reviewed.review_notes.as_deref(), Some("short notice"));

        let stored = store.leave_request(&request.id).await.unwrap();
        assert_eq!(stored.status, LeaveStatus::Rejected);

        let log = store.change_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, "review");
    }

    #[tokio::test]
    async fn leave_review_survives_a_broken_notification_transport() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(FailingNotifier::default());
        let svc = LeaveService::new(store, notifier.clone());

        let request = svc
            .submit(
                "u1",
                LeaveDraft {
                    request_type: LeaveType::Personal,
                    start_date: d("2025-07-05"),
                    end_date: d("2025-07-05"),
                    reason: None,
                },
            )
            .await
            .unwrap();
        let reviewed = svc.review("admin", &request.id, true, None).await;
        assert!(reviewed.is_ok());
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 1);
    }
}
