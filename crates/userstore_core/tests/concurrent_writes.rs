use std::sync::Arc;
use std::thread;
use userstore_core::{NewUser, PageFilter, StoreConfig, UserStorage, UserStore, UserType};

const WRITERS: usize = 4;
const USERS_PER_WRITER: usize = 5;

#[test]
fn concurrent_creates_are_all_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        pool_max_size: WRITERS as u32,
        ..StoreConfig::with_path(dir.path().join("users.db"))
    };
    let store = Arc::new(UserStore::open(&config).unwrap());

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..USERS_PER_WRITER)
                    .map(|index| {
                        let name = format!("w{writer}-u{index}");
                        let user = NewUser::new(name.clone(), 30, UserType::Employee)
                            .with_item(format!("{name}-item"));
                        store.create_user(&user).unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut created: Vec<_> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    created.sort_by_key(|user| user.id);

    let listed = store
        .list_users(&PageFilter::new(1, (WRITERS * USERS_PER_WRITER) as u32))
        .unwrap();
    assert_eq!(listed, created);

    let item_ids: std::collections::HashSet<_> = listed
        .iter()
        .flat_map(|user| user.items.iter().map(|item| item.id))
        .collect();
    assert_eq!(item_ids.len(), WRITERS * USERS_PER_WRITER);
}

#[test]
fn concurrent_deletes_of_the_same_user_succeed_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = UserStore::open(&StoreConfig::with_path(dir.path().join("users.db"))).unwrap();
    let user = store
        .create_user(&NewUser::new("Alice", 30, UserType::Employee).with_item("Laptop"))
        .unwrap();

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || store.delete_user(user.id).is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
}
