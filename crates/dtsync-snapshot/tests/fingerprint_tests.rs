use dtsync_snapshot::{
    DataTypeSnapshot, DocTypeInfo, DocTypeSnapshot, ExclusionPolicy, GenericProperty, PreValue,
    Snapshot, TabSnapshot, hash, hash_excluding, hash_str, recompute, stored_hash,
};
use proptest::prelude::*;
use rstest::rstest;

fn colour_picker(ids: [i32; 2]) -> DataTypeSnapshot {
    DataTypeSnapshot {
        name: "Colour picker".into(),
        key: "0225af17-b302-49cb-9176-b9f35cab9c17".into(),
        id: "Umbraco.ColorPicker".into(),
        database_type: "Nvarchar".into(),
        pre_values: vec![
            PreValue {
                id: ids[0],
                alias: "0".into(),
                value: "ff0000".into(),
            },
            PreValue {
                id: ids[1],
                alias: "1".into(),
                value: "0000ff".into(),
            },
        ],
        hash: None,
    }
}

fn home() -> DocTypeSnapshot {
    DocTypeSnapshot {
        info: Some(DocTypeInfo {
            name: Some("Home".into()),
            alias: "home".into(),
            ..Default::default()
        }),
        generic_properties: Some(vec![GenericProperty {
            name: "Title".into(),
            alias: "title".into(),
            tab: Some("Content".into()),
            sort_order: Some(0),
            ..Default::default()
        }]),
        tabs: Some(vec![TabSnapshot {
            id: 11,
            caption: "Content".into(),
            sort_order: Some(1),
        }]),
        ..Default::default()
    }
}

#[test]
fn pre_value_ids_only_differ_under_plain_hash() {
    let here = colour_picker([1, 2]);
    let there = colour_picker([51, 52]);
    let policy = DataTypeSnapshot::exclusion_policy();

    assert_eq!(
        hash_excluding(&here, &policy).unwrap(),
        hash_excluding(&there, &policy).unwrap()
    );
    assert_ne!(hash(&here).unwrap(), hash(&there).unwrap());
}

#[test]
fn embedded_hash_does_not_feed_its_own_recomputation() {
    let mut snapshot = home();
    let before = recompute(&snapshot, true).unwrap();

    snapshot.set_embedded_hash(Some(before.to_string()));
    assert_eq!(recompute(&snapshot, true).unwrap(), before);
    assert_eq!(stored_hash(&snapshot), Some(before));
}

#[test]
fn stored_hash_absent_or_malformed() {
    let mut snapshot = home();
    assert_eq!(stored_hash(&snapshot), None);

    snapshot.hash = Some("d41d8cd98f00b204e9800998ecf8427e".into());
    assert_eq!(stored_hash(&snapshot), None);
}

#[test]
fn tab_ids_are_excluded_for_doc_types() {
    let mut elsewhere = home();
    elsewhere.tabs.as_mut().unwrap()[0].id = 907;

    assert_eq!(
        recompute(&home(), true).unwrap(),
        recompute(&elsewhere, true).unwrap()
    );
    assert_ne!(
        recompute(&home(), false).unwrap(),
        recompute(&elsewhere, false).unwrap()
    );
}

#[rstest]
#[case::name(|p: &mut GenericProperty| p.name = "Heading".into())]
#[case::validation(|p: &mut GenericProperty| p.validation = "^[A-Z]+$".into())]
#[case::mandatory(|p: &mut GenericProperty| p.mandatory = true)]
#[case::sort_order(|p: &mut GenericProperty| p.sort_order = Some(4))]
#[case::tab(|p: &mut GenericProperty| p.tab = Some("Meta".into()))]
fn author_visible_changes_are_detected(#[case] edit: fn(&mut GenericProperty)) {
    let mut changed = home();
    edit(&mut changed.generic_properties.as_mut().unwrap()[0]);

    assert_ne!(
        recompute(&home(), true).unwrap(),
        recompute(&changed, true).unwrap()
    );
}

proptest! {
    #[test]
    fn any_pre_value_ids_hash_alike(a in any::<i32>(), b in any::<i32>(), c in any::<i32>(), d in any::<i32>()) {
        let policy = ExclusionPolicy::new(["PreValues.Id"]);
        prop_assert_eq!(
            hash_excluding(&colour_picker([a, b]), &policy).unwrap(),
            hash_excluding(&colour_picker([c, d]), &policy).unwrap()
        );
    }

    #[test]
    fn distinct_values_hash_apart(x in "[a-f0-9]{6}", y in "[a-f0-9]{6}") {
        prop_assume!(x != y);
        let mut left = colour_picker([1, 2]);
        let mut right = colour_picker([1, 2]);
        left.pre_values[0].value = x;
        right.pre_values[0].value = y;
        prop_assert_ne!(hash(&left).unwrap(), hash(&right).unwrap());
    }
}

#[test]
fn recompute_equals_hash_of_copy_without_embedded_hash() {
    let mut stamped = home();
    stamped.set_embedded_hash(Some(hash_str("anything").to_string()));

    assert_eq!(recompute(&stamped, false).unwrap(), hash(&home()).unwrap());
}
