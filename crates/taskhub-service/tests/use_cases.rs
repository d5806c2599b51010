use taskhub_service::chats::{self, MembershipChange};
use taskhub_service::{containers, groups, tasks, users, ServiceError};
use taskhub_shared::{
    ChatType, EntityKind, IdentityError, ParticipantStatus, Role, Task, TaskFilter, User,
    UserProfile, ValidationError, VerifiedClaims,
};
use taskhub_store::{Database, StoreError};
use uuid::Uuid;

fn open() -> Database {
    Database::open_in_memory().unwrap()
}

fn register(db: &Database, subject: &str) -> (VerifiedClaims, User) {
    let claims = VerifiedClaims::new(subject);
    let profile = UserProfile {
        username: subject.to_string(),
        email: format!("{subject}@example.com"),
        ..Default::default()
    };
    let user = users::register_user(db, &claims, profile).unwrap();
    (claims, user)
}

#[test]
fn registration_is_keyed_by_claims() {
    let db = open();
    let (claims, user) = register(&db, "alice");
    assert_eq!(user.external_id(), "alice");

    let again = users::register_user(&db, &claims, UserProfile::default()).unwrap();
    assert_eq!(again.id(), user.id());
    assert_eq!(db.list_users().unwrap().len(), 1);

    let err = users::register_user(&db, &VerifiedClaims::new(""), UserProfile::default())
        .unwrap_err();
    assert!(matches!(err, ServiceError::Identity(IdentityError::MissingSubject)));
}

#[test]
fn eng_sprint_fix_bug() {
    let db = open();
    let (claims, alice) = register(&db, "alice");

    let eng = groups::create_group_with_owner(&db, &claims, "Eng", "", "dept").unwrap();
    assert!(db.is_member(eng.id(), alice.id()).unwrap());

    let sprint = containers::create_container(&db, eng.id(), "Sprint1", "", "board").unwrap();
    let fix_bug = Task::new("Fix bug", "", "bug").unwrap();
    let task = tasks::create_task(&db, sprint.id, fix_bug).unwrap();

    let listed = db.list_tasks_by_container(sprint.id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Fix bug");

    assert!(db.delete_task(task.id).unwrap());
    assert!(db.list_tasks_by_container(sprint.id).unwrap().is_empty());
}

#[test]
fn group_validation_happens_before_identity_lookup() {
    let db = open();
    let stranger = VerifiedClaims::new("nobody");

    let err = groups::create_group_with_owner(&db, &stranger, "", "", "dept").unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ValidationError::EmptyName)));

    let err = groups::create_group_with_owner(&db, &stranger, "Eng", "", "dept").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::User, .. }));
    assert!(db.list_usergroups().unwrap().is_empty());
}

#[test]
fn parents_must_exist() {
    let db = open();

    let err = containers::create_container(&db, 42, "Sprint1", "", "").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::UserGroup, .. }));

    let orphan = Task::new("t", "", "").unwrap();
    let err = tasks::create_task(&db, Uuid::new_v4(), orphan).unwrap_err();
    assert!(err.is_not_found());
    assert!(db.list_tasks().unwrap().is_empty());

    let err = tasks::list_group_tasks(&db, 42, TaskFilter::All).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn default_group_requires_membership() {
    let db = open();
    let (claims, alice) = register(&db, "alice");
    let (_, bob) = register(&db, "bob");
    let eng = groups::create_group_with_owner(&db, &claims, "Eng", "", "dept").unwrap();

    let err = users::set_default_group(&db, bob.id(), eng.id()).unwrap_err();
    assert!(matches!(err, ServiceError::NotAMember { .. }));

    let err = users::set_default_group(&db, alice.id(), 999).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::UserGroup, .. }));

    let err = users::set_default_group(&db, alice.id(), -1).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ValidationError::NegativeGroupId(-1))));

    let updated = users::set_default_group(&db, alice.id(), eng.id()).unwrap();
    assert_eq!(updated.default_group_id(), eng.id());
    assert_eq!(db.get_user(alice.id()).unwrap().unwrap().default_group_id(), eng.id());

    let err = users::set_default_group(&db, alice.id(), eng.id()).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ValidationError::NoOpUpdate)));

    let cleared = users::clear_default_group(&db, alice.id()).unwrap();
    assert!(!cleared.has_default_group());
    let again = users::clear_default_group(&db, alice.id()).unwrap();
    assert!(again.updated_at() > cleared.updated_at());
}

#[test]
fn join_and_leave_group() {
    let db = open();
    let (claims, alice) = register(&db, "alice");
    let (_, bob) = register(&db, "bob");
    let eng = groups::create_group_with_owner(&db, &claims, "Eng", "", "dept").unwrap();

    assert!(groups::join_group(&db, eng.id(), bob.id()).unwrap());
    assert!(!groups::join_group(&db, eng.id(), bob.id()).unwrap());
    assert!(groups::join_group(&db, 999, bob.id()).unwrap_err().is_not_found());

    users::set_default_group(&db, bob.id(), eng.id()).unwrap();
    assert!(groups::leave_group(&db, eng.id(), bob.id()).unwrap());
    assert!(!groups::leave_group(&db, eng.id(), bob.id()).unwrap());
    assert!(!db.get_user(bob.id()).unwrap().unwrap().has_default_group());

    let members: Vec<i64> = db
        .list_users_by_group(eng.id())
        .unwrap()
        .iter()
        .map(User::id)
        .collect();
    assert_eq!(members, vec![alice.id()]);
}

#[test]
fn failed_leave_keeps_membership_and_default() {
    let db = open();
    let (claims, _) = register(&db, "alice");
    let (_, bob) = register(&db, "bob");
    let eng = groups::create_group_with_owner(&db, &claims, "Eng", "", "dept").unwrap();
    groups::join_group(&db, eng.id(), bob.id()).unwrap();
    users::set_default_group(&db, bob.id(), eng.id()).unwrap();

    db.conn()
        .execute_batch(
            "CREATE TRIGGER fail_settings_update BEFORE UPDATE ON usersetting
             BEGIN SELECT RAISE(ABORT, 'boom'); END;",
        )
        .unwrap();

    let err = groups::leave_group(&db, eng.id(), bob.id()).unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::RelationshipWrite { .. })));
    assert!(db.is_member(eng.id(), bob.id()).unwrap());
    assert_eq!(db.get_user(bob.id()).unwrap().unwrap().default_group_id(), eng.id());
}

#[test]
fn default_group_zero_clears_the_pointer() {
    let db = open();
    let (claims, alice) = register(&db, "alice");
    let eng = groups::create_group_with_owner(&db, &claims, "Eng", "", "dept").unwrap();

    let err = users::set_default_group(&db, alice.id(), 0).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ValidationError::NoOpUpdate)));

    let set = users::set_default_group(&db, alice.id(), eng.id()).unwrap();
    let cleared = users::set_default_group(&db, alice.id(), 0).unwrap();
    assert!(!cleared.has_default_group());
    assert!(cleared.updated_at() > set.updated_at());
    assert!(!db.get_user(alice.id()).unwrap().unwrap().has_default_group());
}

#[test]
fn task_flags_and_filters() {
    let db = open();
    let (claims, _) = register(&db, "alice");
    let eng = groups::create_group_with_owner(&db, &claims, "Eng", "", "dept").unwrap();
    let sprint = containers::create_container(&db, eng.id(), "Sprint1", "", "").unwrap();

    let a = tasks::create_task(&db, sprint.id, Task::new("A", "", "").unwrap()).unwrap();
    tasks::create_task(&db, sprint.id, Task::new("B", "", "").unwrap()).unwrap();

    let toggled = tasks::toggle_important(&db, a.id).unwrap();
    assert!(toggled.is_important);
    assert!(toggled.updated_at > a.updated_at);

    let important = tasks::list_group_tasks(&db, eng.id(), TaskFilter::Important).unwrap();
    assert_eq!(important.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(), ["A"]);
    let rest = tasks::list_group_tasks(&db, eng.id(), TaskFilter::NotImportant).unwrap();
    assert_eq!(rest.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(), ["B"]);

    assert!(!tasks::toggle_important(&db, a.id).unwrap().is_important);

    let done = tasks::mark_done(&db, a.id).unwrap();
    assert!(done.is_completed);
    assert_eq!(tasks::mark_done(&db, a.id).unwrap().updated_at, done.updated_at);

    assert!(tasks::mark_done(&db, Uuid::new_v4()).unwrap_err().is_not_found());
}

#[test]
fn chats_open_once_per_owner() {
    let db = open();
    let (claims, _) = register(&db, "alice");
    let eng = groups::create_group_with_owner(&db, &claims, "Eng", "", "dept").unwrap();
    let ops = groups::create_group_with_owner(&db, &claims, "Ops", "", "dept").unwrap();
    let sprint = containers::create_container(&db, eng.id(), "Sprint1", "", "").unwrap();

    let group_chat = chats::open_group_chat(&db, eng.id()).unwrap();
    assert_eq!(group_chat.chat_type(), ChatType::Group);
    assert_eq!(chats::open_group_chat(&db, eng.id()).unwrap(), group_chat);

    let container_chat = chats::open_container_chat(&db, eng.id(), sprint.id).unwrap();
    assert_eq!(container_chat.container_id(), Some(sprint.id));
    assert_eq!(chats::open_container_chat(&db, eng.id(), sprint.id).unwrap(), container_chat);

    let err = chats::open_container_chat(&db, ops.id(), sprint.id).unwrap_err();
    assert!(matches!(err, ServiceError::ContainerOutsideGroup { .. }));

    assert!(chats::open_group_chat(&db, 999).unwrap_err().is_not_found());
}

#[test]
fn chat_membership_roles_and_status() {
    let db = open();
    let (claims, alice) = register(&db, "alice");
    let (_, bob) = register(&db, "bob");
    let eng = groups::create_group_with_owner(&db, &claims, "Eng", "", "dept").unwrap();
    let chat = chats::open_group_chat(&db, eng.id()).unwrap();

    let err = chats::toggle_membership(&db, chat.id(), bob.id()).unwrap_err();
    assert!(matches!(err, ServiceError::NotAMember { .. }));

    let change = chats::toggle_membership(&db, chat.id(), alice.id()).unwrap();
    let MembershipChange::Joined(participant) = change else {
        panic!("expected to join, got {change:?}");
    };
    assert_eq!(participant.role(), Role::Member);

    let promoted = chats::change_role(&db, chat.id(), alice.id(), "admin").unwrap();
    assert_eq!(promoted.role(), Role::Admin);
    let muted = chats::change_status(&db, chat.id(), alice.id(), "muted").unwrap();
    assert_eq!(muted.status(), ParticipantStatus::Muted);

    let err = chats::change_role(&db, chat.id(), alice.id(), "owner").unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ValidationError::InvalidRole(_))));
    let stored = db.get_participant_by_user(chat.id(), alice.id()).unwrap().unwrap();
    assert_eq!(stored.role(), Role::Admin);

    assert_eq!(
        chats::toggle_membership(&db, chat.id(), alice.id()).unwrap(),
        MembershipChange::Left
    );
    assert!(chats::change_status(&db, chat.id(), alice.id(), "active")
        .unwrap_err()
        .is_not_found());
}

#[test]
fn unsaved_participant_change_is_not_found() {
    let db = open();
    let (claims, alice) = register(&db, "alice");
    let eng = groups::create_group_with_owner(&db, &claims, "Eng", "", "dept").unwrap();
    let chat = chats::open_group_chat(&db, eng.id()).unwrap();
    chats::toggle_membership(&db, chat.id(), alice.id()).unwrap();

    // Every participant update now touches zero rows.
    db.conn()
        .execute_batch(
            "CREATE TRIGGER skip_participant_update BEFORE UPDATE ON chat_participant
             BEGIN SELECT RAISE(IGNORE); END;",
        )
        .unwrap();

    let err = chats::change_role(&db, chat.id(), alice.id(), "admin").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::ChatParticipant, .. }));
    let err = chats::change_status(&db, chat.id(), alice.id(), "muted").unwrap_err();
    assert!(err.is_not_found());

    let stored = db.get_participant_by_user(chat.id(), alice.id()).unwrap().unwrap();
    assert_eq!(stored.role(), Role::Member);
    assert_eq!(stored.status(), ParticipantStatus::Active);
}

#[test]
fn store_failures_pass_through() {
    let mut db = open();
    let (claims, _) = register(&db, "alice");
    let eng = groups::create_group_with_owner(&db, &claims, "Eng", "", "dept").unwrap();
    let sprint = containers::create_container(&db, eng.id(), "Sprint1", "", "").unwrap();
    for i in 0..300 {
        let task = Task::new(&format!("t{i}"), "", "").unwrap();
        tasks::create_task(&db, sprint.id, task).unwrap();
    }

    db.set_query_timeout(std::time::Duration::ZERO);
    let err = tasks::list_group_tasks(&db, eng.id(), TaskFilter::All).unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::Timeout { .. })));
}
