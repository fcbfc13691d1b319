mod common;

use common::{draft, insert_complaint, insert_employee, insert_user, row_count, setup};
use complaint_core::{
    ActorRef, Complaint, ComplaintComment, ComplaintCommentRepository, ComplaintDraft,
    ComplaintImage, ComplaintImageRepository, ComplaintListQuery, ComplaintRepository,
    ComplaintService,
    ComplaintServiceError, ComplaintStatus, Employee, EmployeeRepository, EmployeeRole,
    RepoError, SqliteComplaintCommentRepository, SqliteComplaintImageRepository,
    SqliteComplaintRepository, SqliteEmployeeRepository, SqliteUserRepository,
    StatusTransitionPolicy, User, UserRepository,
};

#[test]
fn rejected_status_and_reason_persist_together() {
    let conn = setup();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let user = users.create_user(&User::new("", "a@x.com", "hash")).unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    let mut complaint = repo
        .create_complaint(&Complaint::new(user.id.unwrap(), ComplaintDraft::default()))
        .unwrap();
    assert_eq!(complaint.status.as_str(), "OPEN");

    complaint.status = ComplaintStatus::Rejected;
    complaint.reject_reason = Some("duplicate".to_string());
    repo.update_complaint(&mut complaint).unwrap();

    let reloaded = repo.get_complaint(complaint.id.unwrap()).unwrap().unwrap();
    assert_eq!(reloaded.status, ComplaintStatus::Rejected);
    assert_eq!(reloaded.reject_reason.as_deref(), Some("duplicate"));
    assert_eq!(reloaded, complaint);
}

#[test]
fn create_requires_existing_user() {
    let conn = setup();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    let err = repo
        .create_complaint(&Complaint::new(42, draft("no owner")))
        .unwrap_err();
    assert!(matches!(err, RepoError::ConstraintViolation(_)), "{err}");
}

#[test]
fn update_refreshes_updated_at() {
    let conn = setup();
    let user = insert_user(&conn, "a@x.com");
    let mut complaint = insert_complaint(&conn, &user, "hum");
    // Pretend the row was written long ago.
    complaint.created_at -= 60_000;
    complaint.updated_at -= 60_000;
    conn.execute(
        "UPDATE complaints SET created_at = ?1, updated_at = ?2 WHERE id = ?3;",
        rusqlite::params![
            complaint.created_at,
            complaint.updated_at,
            complaint.id.unwrap()
        ],
    )
    .unwrap();
    let stale_updated_at = complaint.updated_at;

    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();
    complaint.product_model = "WM-300".to_string();
    repo.update_complaint(&mut complaint).unwrap();

    assert!(complaint.updated_at > stale_updated_at);
    let reloaded = repo.get_complaint(complaint.id.unwrap()).unwrap().unwrap();
    assert_eq!(reloaded.updated_at, complaint.updated_at);
    assert!(reloaded.updated_at >= reloaded.created_at);
}

#[test]
fn update_missing_complaint_leaves_stamp_untouched() {
    let conn = setup();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();
    let mut complaint = Complaint::new(1, draft("ghost"));
    complaint.id = Some(5);
    complaint.updated_at = complaint.created_at;
    let before = complaint.clone();

    let err = repo.update_complaint(&mut complaint).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "complaint",
            id: 5
        }
    ));
    assert_eq!(complaint, before);
}

#[test]
fn list_filters_by_user_status_and_assignee() {
    let conn = setup();
    let ada = insert_user(&conn, "ada@x.com");
    let bob = insert_user(&conn, "bob@x.com");
    let agent = insert_employee(&conn, "agent@corp.com", EmployeeRole::Agent);
    let manager = insert_employee(&conn, "manager@corp.com", EmployeeRole::Manager);
    insert_complaint(&conn, &ada, "one");
    let two = insert_complaint(&conn, &ada, "two");
    insert_complaint(&conn, &bob, "three");

    let service = ComplaintService::new(SqliteComplaintRepository::try_new(&conn).unwrap());
    service
        .assign(two.id.unwrap(), agent.id.unwrap(), manager.id.unwrap())
        .unwrap();

    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();
    let by_user = repo
        .list_complaints(&ComplaintListQuery {
            user_id: ada.id,
            ..ComplaintListQuery::default()
        })
        .unwrap();
    assert_eq!(by_user.len(), 2);

    let assigned = repo
        .list_complaints(&ComplaintListQuery {
            status: Some(ComplaintStatus::Assigned),
            assigned_to: agent.id,
            ..ComplaintListQuery::default()
        })
        .unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].id, two.id);

    let paged = repo
        .list_complaints(&ComplaintListQuery {
            limit: Some(2),
            offset: 1,
            ..ComplaintListQuery::default()
        })
        .unwrap();
    assert_eq!(paged.len(), 2);
}

#[test]
fn load_details_returns_owned_collections() {
    let conn = setup();
    let user = insert_user(&conn, "a@x.com");
    let complaint = insert_complaint(&conn, &user, "cracked lid");
    let author = ActorRef::User(user.id.unwrap());
    SqliteComplaintCommentRepository::try_new(&conn)
        .unwrap()
        .save(&ComplaintComment::new(complaint.id.unwrap(), author, "see photo"))
        .unwrap();
    SqliteComplaintImageRepository::try_new(&conn)
        .unwrap()
        .save(&ComplaintImage::new(
            complaint.id.unwrap(),
            author,
            "https://files.example.com/lid.jpg",
        ))
        .unwrap();

    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();
    let details = repo.load_details(complaint.id.unwrap()).unwrap().unwrap();
    assert_eq!(details.complaint, complaint);
    assert_eq!(details.comments.len(), 1);
    assert_eq!(details.images.len(), 1);
    assert!(repo.load_details(9_999).unwrap().is_none());
}

#[test]
fn delete_complaint_removes_its_children_only() {
    let conn = setup();
    let user = insert_user(&conn, "a@x.com");
    let doomed = insert_complaint(&conn, &user, "doomed");
    let kept = insert_complaint(&conn, &user, "kept");
    let author = ActorRef::User(user.id.unwrap());
    let comments = SqliteComplaintCommentRepository::try_new(&conn).unwrap();
    comments
        .save(&ComplaintComment::new(doomed.id.unwrap(), author, "x"))
        .unwrap();
    comments
        .save(&ComplaintComment::new(kept.id.unwrap(), author, "y"))
        .unwrap();
    let images = SqliteComplaintImageRepository::try_new(&conn).unwrap();
    for (complaint, url) in [
        (&doomed, "s3://complaints/doomed-1.png"),
        (&doomed, "s3://complaints/doomed-2.png"),
        (&kept, "s3://complaints/kept.png"),
    ] {
        images
            .save(&ComplaintImage::new(complaint.id.unwrap(), author, url))
            .unwrap();
    }

    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();
    let summary = repo.delete_complaint(doomed.id.unwrap()).unwrap();

    assert_eq!(summary.complaints, 1);
    assert_eq!(summary.comments, 1);
    assert_eq!(summary.images, 2);
    assert_eq!(row_count(&conn, "complaint_comments"), 1);
    assert_eq!(
        images.list_for_complaint(kept.id.unwrap()).unwrap()[0].file_url,
        "s3://complaints/kept.png"
    );
    assert_eq!(row_count(&conn, "complaint_images"), 1);
    assert!(repo.get_complaint(kept.id.unwrap()).unwrap().is_some());
    assert!(matches!(
        repo.delete_complaint(doomed.id.unwrap()).unwrap_err(),
        RepoError::NotFound { .. }
    ));
}

#[test]
fn service_submit_assign_and_resolve() {
    let conn = setup();
    let user = insert_user(&conn, "a@x.com");
    let agent = insert_employee(&conn, "agent@corp.com", EmployeeRole::Agent);
    let manager = insert_employee(&conn, "manager@corp.com", EmployeeRole::Manager);
    let service = ComplaintService::new(SqliteComplaintRepository::try_new(&conn).unwrap());

    let submitted = service.submit(user.id.unwrap(), draft("won't drain")).unwrap();
    assert_eq!(submitted.status, ComplaintStatus::Open);

    let assigned = service
        .assign(submitted.id.unwrap(), agent.id.unwrap(), manager.id.unwrap())
        .unwrap();
    assert_eq!(assigned.status, ComplaintStatus::Assigned);
    assert_eq!(assigned.assigned_to, agent.id);
    assert_eq!(assigned.assigned_by, manager.id);

    service
        .transition_status(submitted.id.unwrap(), ComplaintStatus::InProgress, None)
        .unwrap();
    let resolved = service
        .transition_status(submitted.id.unwrap(), ComplaintStatus::Resolved, Some("ignored"))
        .unwrap();
    assert_eq!(resolved.status, ComplaintStatus::Resolved);
    assert_eq!(resolved.reject_reason, None);

    let err = service
        .transition_status(submitted.id.unwrap(), ComplaintStatus::Open, None)
        .unwrap_err();
    assert!(matches!(
        err,
        ComplaintServiceError::TransitionNotAllowed {
            from: ComplaintStatus::Resolved,
            to: ComplaintStatus::Open,
        }
    ));
}

#[test]
fn service_requires_reject_reason_for_rejection() {
    let conn = setup();
    let user = insert_user(&conn, "a@x.com");
    let service = ComplaintService::new(SqliteComplaintRepository::try_new(&conn).unwrap());
    let complaint = service.submit(user.id.unwrap(), draft("spam")).unwrap();
    let id = complaint.id.unwrap();

    let err = service
        .transition_status(id, ComplaintStatus::Rejected, Some("   "))
        .unwrap_err();
    assert!(matches!(
        err,
        ComplaintServiceError::MissingRejectReason(ComplaintStatus::Rejected)
    ));
    assert_eq!(service.get(id).unwrap().status, ComplaintStatus::Open);

    let rejected = service
        .transition_status(id, ComplaintStatus::Rejected, Some(" duplicate "))
        .unwrap();
    assert_eq!(rejected.reject_reason.as_deref(), Some("duplicate"));
}

#[test]
fn service_reports_missing_complaint() {
    let conn = setup();
    let service = ComplaintService::new(SqliteComplaintRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.get(31).unwrap_err(),
        ComplaintServiceError::ComplaintNotFound(31)
    ));
    assert!(matches!(
        service
            .transition_status(31, ComplaintStatus::Closed, None)
            .unwrap_err(),
        ComplaintServiceError::ComplaintNotFound(31)
    ));
}

struct LinearWorkflow;

impl StatusTransitionPolicy for LinearWorkflow {
    fn allows(&self, from: ComplaintStatus, to: ComplaintStatus) -> bool {
        matches!(
            (from, to),
            (ComplaintStatus::Open, ComplaintStatus::Assigned)
                | (ComplaintStatus::Assigned, ComplaintStatus::InProgress)
                | (ComplaintStatus::InProgress, ComplaintStatus::Resolved)
                | (ComplaintStatus::Resolved, ComplaintStatus::Closed)
        )
    }

    fn requires_reject_reason(&self, _status: ComplaintStatus) -> bool {
        false
    }
}

#[test]
fn service_honors_injected_policy() {
    let conn = setup();
    let user = insert_user(&conn, "a@x.com");
    let service = ComplaintService::with_policy(
        SqliteComplaintRepository::try_new(&conn).unwrap(),
        LinearWorkflow,
    );
    let agent = insert_employee(&conn, "agent@corp.com", EmployeeRole::Agent);
    let manager = insert_employee(&conn, "manager@corp.com", EmployeeRole::Manager);
    let complaint = service.submit(user.id.unwrap(), draft("squeaks")).unwrap();
    let id = complaint.id.unwrap();

    let err = service
        .transition_status(id, ComplaintStatus::Resolved, None)
        .unwrap_err();
    assert!(matches!(err, ComplaintServiceError::TransitionNotAllowed { .. }));

    let assigned = service
        .assign(id, agent.id.unwrap(), manager.id.unwrap())
        .unwrap();
    assert_eq!(assigned.status, ComplaintStatus::Assigned);
    service
        .transition_status(id, ComplaintStatus::InProgress, None)
        .unwrap();

    let err = service
        .assign(id, manager.id.unwrap(), manager.id.unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        ComplaintServiceError::TransitionNotAllowed {
            from: ComplaintStatus::InProgress,
            to: ComplaintStatus::Assigned,
        }
    ));
    assert_eq!(service.get(id).unwrap().assigned_to, agent.id);
}

struct AnythingGoes;

impl StatusTransitionPolicy for AnythingGoes {
    fn allows(&self, _from: ComplaintStatus, _to: ComplaintStatus) -> bool {
        true
    }

    fn requires_reject_reason(&self, _status: ComplaintStatus) -> bool {
        false
    }
}

#[test]
fn assignment_of_resolved_complaint_follows_policy() {
    let conn = setup();
    let user = insert_user(&conn, "a@x.com");
    let agent = insert_employee(&conn, "agent@corp.com", EmployeeRole::Agent);
    let manager = insert_employee(&conn, "manager@corp.com", EmployeeRole::Manager);
    let id = {
        let strict = ComplaintService::new(SqliteComplaintRepository::try_new(&conn).unwrap());
        let id = strict.submit(user.id.unwrap(), draft("fixed")).unwrap().id.unwrap();
        strict
            .transition_status(id, ComplaintStatus::Resolved, None)
            .unwrap();
        assert!(matches!(
            strict
                .assign(id, agent.id.unwrap(), manager.id.unwrap())
                .unwrap_err(),
            ComplaintServiceError::TransitionNotAllowed {
                from: ComplaintStatus::Resolved,
                ..
            }
        ));
        id
    };

    let permissive = ComplaintService::with_policy(
        SqliteComplaintRepository::try_new(&conn).unwrap(),
        AnythingGoes,
    );
    let assigned = permissive
        .assign(id, agent.id.unwrap(), manager.id.unwrap())
        .unwrap();

    assert_eq!(assigned.status, ComplaintStatus::Resolved);
    assert_eq!(assigned.assigned_to, agent.id);
    assert_eq!(assigned.assigned_by, manager.id);
}

#[test]
fn deleting_supervisor_keeps_subordinates_and_clears_assignments() {
    let conn = setup();
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let manager = insert_employee(&conn, "manager@corp.com", EmployeeRole::Manager);
    let mut report = Employee::new("Cy", "cy@corp.com", "hash", EmployeeRole::Agent);
    report.supervisor_id = manager.id;
    let report = employees.create_employee(&report).unwrap();

    let user = insert_user(&conn, "a@x.com");
    let complaint = insert_complaint(&conn, &user, "stuck door");
    ComplaintService::new(SqliteComplaintRepository::try_new(&conn).unwrap())
        .assign(complaint.id.unwrap(), report.id.unwrap(), manager.id.unwrap())
        .unwrap();
    assert_eq!(employees.list_subordinates(manager.id.unwrap()).unwrap().len(), 1);

    let summary = employees.delete_employee(manager.id.unwrap()).unwrap();
    assert_eq!(summary.subordinates, 1);
    assert_eq!(summary.complaints, 1);

    let kept = employees.get_employee(report.id.unwrap()).unwrap().unwrap();
    assert_eq!(kept.supervisor_id, None);
    let complaint = SqliteComplaintRepository::try_new(&conn)
        .unwrap()
        .get_complaint(complaint.id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(complaint.assigned_to, report.id);
    assert_eq!(complaint.assigned_by, None);
}

#[test]
fn employee_email_is_not_unique() {
    let conn = setup();
    insert_employee(&conn, "shared@corp.com", EmployeeRole::Agent);
    insert_employee(&conn, "shared@corp.com", EmployeeRole::Admin);

    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();
    assert_eq!(employees.list_employees().unwrap().len(), 2);
}

#[test]
fn unknown_supervisor_is_a_constraint_violation() {
    let conn = setup();
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let mut orphan = Employee::new("Di", "di@corp.com", "hash", EmployeeRole::Agent);
    orphan.supervisor_id = Some(500);

    let err = employees.create_employee(&orphan).unwrap_err();
    assert!(matches!(err, RepoError::ConstraintViolation(_)));
}
