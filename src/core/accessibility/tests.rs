use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::core::accessibility::*;
use crate::core::errors::AccessibilityError;

static OBJECT: TypeInfo = TypeInfo::new("Object", None);
static WIDGET: TypeInfo = TypeInfo::new("Widget", Some(&OBJECT));
static BUTTON: TypeInfo = TypeInfo::new("PushButton", Some(&WIDGET));

struct TestInterface {
    object: Option<ObjectRef>,
    role: Role,
    valid: Cell<bool>,
}

impl AccessibleInterface for TestInterface {
    fn object(&self) -> Option<ObjectRef> {
        self.object
    }

    fn is_valid(&self) -> bool {
        self.valid.get()
    }

    fn role(&self) -> Role {
        self.role
    }
}

fn object(id: u64, info: &'static TypeInfo) -> ObjectRef {
    ObjectRef::new(ObjectId(id), TypeTag::of(info))
}

fn interface_for(object: Option<ObjectRef>) -> Rc<TestInterface> {
    Rc::new(TestInterface {
        object,
        role: Role::Client,
        valid: Cell::new(true),
    })
}

fn as_rc(iface: &Rc<TestInterface>) -> InterfaceRc {
    iface.clone()
}

#[test]
fn test_register_then_destroy_owner() {
    let mut cache = AccessibilityCache::default();
    let owner = object(1, &WIDGET);
    let iface = as_rc(&interface_for(Some(owner)));

    let id = cache.register_object(Some(owner), iface.clone()).unwrap();
    assert!(id.get() > i32::MAX as u32);
    assert_eq!(cache.identity_for_interface(&iface), Some(id));
    assert!(cache.contains_object(&owner));

    assert_eq!(cache.object_destroyed(owner.id), 1);
    assert!(cache.interface(id).is_none());
    assert!(cache.identity_for_interface(&iface).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_destroy_purges_every_construction_stage() {
    let mut cache = AccessibilityCache::default();
    // Same object seen as a Widget while its base constructor runs, then as
    // a PushButton once construction finished.
    let early = object(9, &WIDGET);
    let late = object(9, &BUTTON);
    let first = cache.register_object(Some(early), as_rc(&interface_for(Some(early)))).unwrap();
    let second = cache.register_object(Some(late), as_rc(&interface_for(Some(late)))).unwrap();
    assert_ne!(first, second);
    assert_eq!(cache.identity_for_object(&early), Some(first));
    assert_eq!(cache.identity_for_object(&late), Some(second));

    assert_eq!(cache.object_destroyed(ObjectId(9)), 2);
    assert!(cache.interface(first).is_none());
    assert!(cache.interface(second).is_none());

    // Second notification for the same owner is a no-op.
    assert_eq!(cache.object_destroyed(ObjectId(9)), 0);
}

#[test]
fn test_contract_violations_leave_cache_untouched() {
    let mut cache = AccessibilityCache::default();
    let owner = object(3, &WIDGET);
    let iface = as_rc(&interface_for(Some(owner)));
    let id = cache.register_object(Some(owner), iface.clone()).unwrap();

    assert_eq!(
        cache.register_object(Some(owner), iface.clone()),
        Err(AccessibilityError::DuplicateInterface(id))
    );

    let other = as_rc(&interface_for(Some(owner)));
    assert!(matches!(
        cache.register_object(Some(owner), other),
        Err(AccessibilityError::DuplicateObject { existing, .. }) if existing == id
    ));

    let stranger = as_rc(&interface_for(Some(object(4, &WIDGET))));
    assert_eq!(
        cache.register_object(Some(owner), stranger),
        Err(AccessibilityError::OwnerMismatch { given: ObjectId(3), actual: Some(ObjectId(4)) })
    );

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.identities(), vec![id]);
}

#[test]
fn test_register_without_owner_still_tracks_object() {
    let mut cache = AccessibilityCache::default();
    let owner = object(5, &WIDGET);
    let iface = interface_for(Some(owner));

    let id = cache.register_object(None, as_rc(&iface)).unwrap();
    assert!(cache.contains_object(&owner));

    // A second interface for the same object is still a duplicate
    let other = as_rc(&interface_for(Some(owner)));
    assert_eq!(
        cache.register_object(None, other),
        Err(AccessibilityError::DuplicateObject {
            object: ObjectId(5),
            type_name: TypeTag::of(&WIDGET).name(),
            existing: id,
        })
    );

    assert_eq!(cache.object_destroyed(owner.id), 1);
    assert!(cache.interface(id).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_release_is_idempotent() {
    let mut cache = AccessibilityCache::default();
    let owner = object(5, &BUTTON);
    let id = cache.register_object(Some(owner), as_rc(&interface_for(Some(owner)))).unwrap();

    assert!(!cache.release(id, Some(ObjectId(6))));
    assert!(cache.interface(id).is_some());

    assert!(cache.release(id, Some(owner.id)));
    assert!(!cache.release(id, None));
    assert!(cache.interface(id).is_none());
    assert!(!cache.contains_object(&owner));

    // The owner may register again after an explicit release.
    let again = cache.register_object(Some(owner), as_rc(&interface_for(Some(owner)))).unwrap();
    assert_ne!(again, id);
    assert_eq!(cache.object_destroyed(owner.id), 1);
}

#[test]
fn test_release_drops_cache_reference() {
    let mut cache = AccessibilityCache::default();
    let iface = interface_for(None);
    let id = cache.register_object(None, as_rc(&iface)).unwrap();
    assert_eq!(Rc::strong_count(&iface), 2);

    cache.release(id, None);
    assert_eq!(Rc::strong_count(&iface), 1);
}

#[test]
fn test_identities_unique_and_maps_consistent() {
    let range = IdentityRange::new(1, 9).unwrap();
    let mut cache = AccessibilityCache::new(range);
    let mut live = Vec::new();

    for round in 0..40u64 {
        let iface = as_rc(&interface_for(None));
        let id = cache.register_object(None, iface.clone()).unwrap();
        live.push((id, iface));
        if round % 3 == 0 {
            let (old, _) = live.remove(0);
            assert!(cache.release(old, None));
        }
        if live.len() >= 7 {
            let (old, _) = live.remove(live.len() / 2);
            cache.release(old, None);
        }

        let ids: HashSet<_> = live.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids.len(), live.len());
        for (id, iface) in &live {
            assert!(range.contains(id.get()));
            let resolved = cache.interface(*id).unwrap();
            assert!(Rc::ptr_eq(&resolved, iface));
            assert_eq!(cache.identity_for_interface(iface), Some(*id));
        }
    }
}

#[test]
fn test_exhausted_identity_space() {
    let mut cache = AccessibilityCache::new(IdentityRange::new(100, 102).unwrap());
    let keep: Vec<_> = (0..2).map(|_| as_rc(&interface_for(None))).collect();
    for iface in &keep {
        cache.register_object(None, iface.clone()).unwrap();
    }

    let result = cache.register_object(None, as_rc(&interface_for(None)));
    assert_eq!(result, Err(AccessibilityError::IdentitySpaceExhausted { live: 2 }));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_query_walks_type_chain_and_caches() {
    let calls = Rc::new(Cell::new(0));
    let mut factories = FactoryTable::new();
    let counter = calls.clone();
    factories.install(TypeTag::of(&WIDGET), move |object| {
        counter.set(counter.get() + 1);
        Some(as_rc(&interface_for(Some(*object))))
    });

    let mut cache = AccessibilityCache::default();
    let button = object(20, &BUTTON);
    let first = cache.query_interface(&button, &factories).unwrap();
    let second = cache.query_interface(&button, &factories).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(calls.get(), 1);

    // No factory anywhere on the chain.
    assert!(cache.query_interface(&object(21, &OBJECT), &factories).is_none());
}

#[test]
fn test_most_derived_factory_wins() {
    let mut factories = FactoryTable::new();
    factories.install(TypeTag::of(&WIDGET), |object| {
        Some(Rc::new(TestInterface { object: Some(*object), role: Role::Pane, valid: Cell::new(true) }) as InterfaceRc)
    });
    let button_factory = factories.install(TypeTag::of(&BUTTON), |object| {
        Some(Rc::new(TestInterface { object: Some(*object), role: Role::PushButton, valid: Cell::new(true) }) as InterfaceRc)
    });
    // Declining factories fall through to the next candidate.
    factories.install(TypeTag::of(&BUTTON), |_| None);

    let button = object(30, &BUTTON);
    assert_eq!(factories.create(&button).unwrap().role(), Role::PushButton);

    assert!(factories.remove(button_factory));
    assert!(!factories.remove(button_factory));
    assert_eq!(factories.create(&button).unwrap().role(), Role::Pane);
    assert_eq!(factories.len(), 2);
}

#[test]
fn test_invalid_cached_interface_is_hidden() {
    let mut cache = AccessibilityCache::default();
    let owner = object(40, &WIDGET);
    let iface = interface_for(Some(owner));
    cache.register_object(Some(owner), as_rc(&iface)).unwrap();

    iface.valid.set(false);
    assert!(cache.query_interface(&owner, &FactoryTable::new()).is_none());
    assert!(cache.contains_object(&owner));
}

#[test]
fn test_unique_id_registers_once() {
    let mut cache = AccessibilityCache::default();
    let owner = object(50, &WIDGET);
    let iface = as_rc(&interface_for(Some(owner)));

    let id = cache.unique_id(&iface).unwrap();
    assert_eq!(cache.unique_id(&iface).unwrap(), id);
    assert_eq!(cache.identity_for_object(&owner), Some(id));
    assert_eq!(cache.entry(id).unwrap().owner, Some(owner.id));
}

#[test]
fn test_clear_drops_everything() {
    let mut cache = AccessibilityCache::default();
    let owner = object(60, &WIDGET);
    let iface = interface_for(Some(owner));
    cache.register_object(Some(owner), as_rc(&iface)).unwrap();
    cache.register_object(None, as_rc(&interface_for(None))).unwrap();

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(Rc::strong_count(&iface), 1);
    assert_eq!(cache.object_destroyed(owner.id), 0);
}
