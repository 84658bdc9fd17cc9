use std::sync::Arc;
use userstore_core::{
    CreateItemRequest, CreateUserRequest, DeleteUserRequest, ErrorKind, GetUserRequest,
    ListUserRequest, PageFilterRequest, StoreError, UpdateItemRequest, UpdateUserRequest,
    UserService, UserStore, UserType,
};

fn service() -> UserService<Arc<UserStore>> {
    UserService::new(Arc::new(UserStore::open_in_memory().unwrap()))
}

fn create_request(name: &str, age: i32, items: &[&str]) -> CreateUserRequest {
    CreateUserRequest {
        name: name.to_string(),
        age,
        user_type: UserType::Employee,
        items: items
            .iter()
            .map(|name| CreateItemRequest {
                name: name.to_string(),
            })
            .collect(),
    }
}

fn list_all() -> ListUserRequest {
    ListUserRequest {
        page_filter: Some(PageFilterRequest {
            page: 1,
            limit: 100,
        }),
    }
}

#[test]
fn request_flow_covers_the_full_lifecycle() {
    let service = service();

    let created = service
        .create_user(&create_request("Alice", 30, &["Laptop"]))
        .unwrap();
    let id = created.id.to_string();

    let loaded = service.get_user(&GetUserRequest { id: id.clone() }).unwrap();
    assert_eq!(loaded, created);

    let updated = service
        .update_user(&UpdateUserRequest {
            id: id.clone(),
            name: "Alice Smith".to_string(),
            age: 31,
            user_type: UserType::Contractor,
            items: vec![UpdateItemRequest {
                id: created.items[0].id.to_string(),
                name: "Laptop Pro".to_string(),
            }],
        })
        .unwrap();
    assert_eq!(updated.name, "Alice Smith");
    assert_eq!(updated.items[0].name, "Laptop Pro");

    let listed = service.list_users(&list_all()).unwrap();
    assert_eq!(listed, vec![updated]);

    service
        .delete_user(&DeleteUserRequest { id: id.clone() })
        .unwrap();
    let err = service.get_user(&GetUserRequest { id }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn invalid_create_requests_store_nothing() {
    let service = service();

    for request in [
        create_request("Alice", 0, &[]),
        create_request("", 30, &[]),
        create_request("Alice", 30, &["Laptop", "  "]),
    ] {
        let err = service.create_user(&request).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    assert!(service.list_users(&list_all()).unwrap().is_empty());
}

#[test]
fn malformed_ids_are_invalid_input() {
    let service = service();

    let err = service
        .get_user(&GetUserRequest {
            id: "not-a-uuid".to_string(),
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = service
        .delete_user(&DeleteUserRequest { id: String::new() })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn update_with_malformed_item_id_leaves_user_unchanged() {
    let service = service();
    let created = service
        .create_user(&create_request("Alice", 30, &["Laptop"]))
        .unwrap();

    let err = service
        .update_user(&UpdateUserRequest {
            id: created.id.to_string(),
            name: "Mallory".to_string(),
            age: 40,
            user_type: UserType::Customer,
            items: vec![UpdateItemRequest {
                id: "first".to_string(),
                name: "Monitor".to_string(),
            }],
        })
        .unwrap_err();
    assert!(err.to_string().contains("item #0"));

    let loaded = service
        .get_user(&GetUserRequest {
            id: created.id.to_string(),
        })
        .unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn list_requires_a_positive_page_filter() {
    let service = service();

    let err = service
        .list_users(&ListUserRequest { page_filter: None })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = service
        .list_users(&ListUserRequest {
            page_filter: Some(PageFilterRequest { page: 1, limit: -1 }),
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn list_with_largest_page_filter_returns_empty_page() {
    let service = service();
    service
        .create_user(&create_request("Alice", 30, &["Laptop"]))
        .unwrap();

    let max = i64::from(u32::MAX);
    let page = service
        .list_users(&ListUserRequest {
            page_filter: Some(PageFilterRequest {
                page: max,
                limit: max,
            }),
        })
        .unwrap();
    assert!(page.is_empty());
}

#[test]
fn services_share_one_store() {
    let store = Arc::new(UserStore::open_in_memory().unwrap());
    let writer = UserService::new(Arc::clone(&store));
    let reader = UserService::new(store);

    let created = writer
        .create_user(&create_request("Alice", 30, &[]))
        .unwrap();
    let loaded = reader
        .get_user(&GetUserRequest {
            id: created.id.to_string(),
        })
        .unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_request_deserializes_without_items() {
    let request: CreateUserRequest =
        serde_json::from_str(r#"{"name":"Bob","age":41,"user_type":"customer"}"#).unwrap();
    assert!(request.items.is_empty());

    let created = service().create_user(&request).unwrap();
    assert_eq!(created.user_type, UserType::Customer);
    assert!(created.items.is_empty());
}
