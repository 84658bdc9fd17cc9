use std::collections::HashSet;
use userstore_core::{ErrorKind, NewUser, PageFilter, User, UserStorage, UserStore, UserType};

fn seed(store: &UserStore, count: usize) -> Vec<User> {
    (0..count)
        .map(|index| {
            let age = 20 + index as i32;
            let mut user = NewUser::new(format!("user-{index}"), age, UserType::Employee);
            for item in 0..(index % 3) {
                user = user.with_item(format!("item-{index}-{item}"));
            }
            store.create_user(&user).unwrap()
        })
        .collect()
}

#[test]
fn consecutive_pages_are_disjoint_and_cover_all_users() {
    let store = UserStore::open_in_memory().unwrap();
    let seeded = seed(&store, 10);

    let first = store.list_users(&PageFilter::new(1, 5)).unwrap();
    let second = store.list_users(&PageFilter::new(2, 5)).unwrap();
    assert_eq!(first.len(), 5);
    assert_eq!(second.len(), 5);

    let first_ids: HashSet<_> = first.iter().map(|user| user.id).collect();
    let second_ids: HashSet<_> = second.iter().map(|user| user.id).collect();
    assert!(first_ids.is_disjoint(&second_ids));

    let all: HashSet<_> = first_ids.union(&second_ids).copied().collect();
    let expected: HashSet<_> = seeded.iter().map(|user| user.id).collect();
    assert_eq!(all, expected);
}

#[test]
fn listed_users_are_sorted_by_id_with_complete_items() {
    let store = UserStore::open_in_memory().unwrap();
    let mut seeded = seed(&store, 7);
    seeded.sort_by_key(|user| user.id);

    let listed = store.list_users(&PageFilter::new(1, 100)).unwrap();
    assert_eq!(listed, seeded);

    for pair in listed.windows(2) {
        assert!(pair[0].id < pair[1].id);
    }
}

#[test]
fn page_limit_counts_users_not_items() {
    let store = UserStore::open_in_memory().unwrap();
    for index in 0..3 {
        store
            .create_user(
                &NewUser::new(format!("user-{index}"), 30, UserType::Customer)
                    .with_item("a")
                    .with_item("b")
                    .with_item("c"),
            )
            .unwrap();
    }

    let page = store.list_users(&PageFilter::new(1, 2)).unwrap();
    assert_eq!(page.len(), 2);
    assert!(page.iter().all(|user| user.items.len() == 3));
}

#[test]
fn page_past_the_end_is_empty() {
    let store = UserStore::open_in_memory().unwrap();
    seed(&store, 3);

    let page = store.list_users(&PageFilter::new(5, 10)).unwrap();
    assert!(page.is_empty());

    let empty_store = UserStore::open_in_memory().unwrap();
    assert!(empty_store
        .list_users(&PageFilter::new(1, 10))
        .unwrap()
        .is_empty());
}

#[test]
fn offset_beyond_i64_range_is_an_empty_page() {
    let store = UserStore::open_in_memory().unwrap();
    seed(&store, 2);

    let page = store
        .list_users(&PageFilter::new(u32::MAX, u32::MAX))
        .unwrap();
    assert!(page.is_empty());
}

#[test]
fn zero_page_or_limit_is_invalid_input() {
    let store = UserStore::open_in_memory().unwrap();

    let err = store.list_users(&PageFilter::new(0, 10)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = store.list_users(&PageFilter::new(1, 0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn listing_is_deterministic() {
    let store = UserStore::open_in_memory().unwrap();
    seed(&store, 6);

    let first = store.list_users(&PageFilter::new(2, 4)).unwrap();
    let second = store.list_users(&PageFilter::new(2, 4)).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
