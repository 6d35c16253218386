mod common;

use common::{harness, memory_session, Harness, PASSWORD};
use portfolio_auth::{
    dto::{
        admin::{ListUsersQuery, UpdateUserRequest},
        auth::RegisterRequest,
    },
    password::verify_password,
    repos::UserRepository,
    services::Authenticated,
    AppError,
};

async fn admin(h: &Harness) -> Authenticated {
    h.register("Admin", "admin@example.com").await;
    let (_store, session) = memory_session();
    h.state
        .auth
        .login(&session, "admin@example.com", PASSWORD, false)
        .await
        .expect("login");
    h.state.auth.authenticate(&session).await.expect("auth")
}

fn query(page: u64, per_page: u64, search: Option<&str>) -> ListUsersQuery {
    ListUsersQuery {
        page: Some(page),
        per_page: Some(per_page),
        search: search.map(str::to_string),
    }
}

#[tokio::test]
async fn listing_is_paginated_newest_first() {
    let h = harness();
    let auth = admin(&h).await;
    for i in 0..4 {
        h.advance(1);
        h.register(&format!("User {i}"), &format!("user{i}@example.com")).await;
    }

    let first = h
        .state
        .admin
        .list(&auth, query(1, 2, None).into())
        .await
        .expect("page 1");
    assert_eq!(first.total_count, 5);
    assert_eq!(first.page, 1);
    assert_eq!(first.per_page, 2);
    let names: Vec<_> = first.data.iter().map(|u| u.full_name.as_str()).collect();
    assert_eq!(names, ["User 3", "User 2"]);

    let last = h
        .state
        .admin
        .list(&auth, query(3, 2, None).into())
        .await
        .expect("page 3");
    assert_eq!(last.data.len(), 1);
    assert_eq!(last.data[0].email, "admin@example.com");
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() {
    let h = harness();
    let auth = admin(&h).await;

    let page = h
        .state
        .admin
        .list(&auth, query(u64::MAX, 100, None).into())
        .await
        .expect("list");
    assert!(page.data.is_empty());
    assert_eq!(page.total_count, 1);
    assert_eq!(page.page, u64::MAX);
}

#[tokio::test]
async fn search_matches_name_or_email_case_insensitively() {
    let h = harness();
    let auth = admin(&h).await;
    h.register("Grace Hopper", "grace@navy.example").await;
    h.register("Alan Turing", "alan@example.com").await;

    let by_name = h
        .state
        .admin
        .list(&auth, query(1, 10, Some("HOPPER")).into())
        .await
        .expect("search");
    assert_eq!(by_name.total_count, 1);
    assert_eq!(by_name.data[0].email, "grace@navy.example");

    let by_email = h
        .state
        .admin
        .list(&auth, query(1, 10, Some("example.com")).into())
        .await
        .expect("search");
    assert_eq!(by_email.total_count, 2);
}

#[tokio::test]
async fn create_get_update_delete() {
    let h = harness();
    let auth = admin(&h).await;

    let created = h
        .state
        .admin
        .create(
            &auth,
            RegisterRequest {
                full_name: "Grace".into(),
                email: "grace@example.com".into(),
                password: PASSWORD.into(),
            },
        )
        .await
        .expect("create");
    assert_eq!(h.state.admin.count(&auth).await.expect("count"), 2);

    let fetched = h.state.admin.get(&auth, &created.id).await.expect("get");
    assert_eq!(fetched, created);

    let updated = h
        .state
        .admin
        .update(
            &auth,
            &created.id,
            UpdateUserRequest {
                full_name: Some("Grace Hopper".into()),
                email: None,
                password: Some("a-brand-new-password".into()),
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.full_name, "Grace Hopper");
    let stored = h
        .users
        .find_by_email("grace@example.com")
        .await
        .expect("lookup")
        .expect("present");
    assert!(verify_password("a-brand-new-password".into(), stored.password_hash)
        .await
        .unwrap());

    let removed = h.state.admin.delete(&auth, &created.id).await.expect("delete");
    assert_eq!(removed.id, created.id);
    assert!(matches!(
        h.state.admin.get(&auth, &created.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let h = harness();
    let auth = admin(&h).await;

    for id in ["65f0c0ffee0000000000beef", "not-an-object-id"] {
        assert!(matches!(h.state.admin.get(&auth, id).await, Err(AppError::NotFound)));
        assert!(matches!(
            h.state.admin.delete(&auth, id).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            h.state
                .admin
                .update(&auth, id, UpdateUserRequest::default())
                .await,
            Err(AppError::NotFound)
        ));
    }
}

#[tokio::test]
async fn admin_create_respects_unique_emails() {
    let h = harness();
    let auth = admin(&h).await;

    let dup = h
        .state
        .admin
        .create(
            &auth,
            RegisterRequest {
                full_name: "Impostor".into(),
                email: "ADMIN@example.com".into(),
                password: PASSWORD.into(),
            },
        )
        .await;
    assert!(matches!(dup, Err(AppError::DuplicateEmail)));
    assert_eq!(h.state.admin.count(&auth).await.expect("count"), 1);
}
