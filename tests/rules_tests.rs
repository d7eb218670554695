mod common;

use common::{organizer, player};

use nitrocup_core::commands::rules::set_rules;
use nitrocup_core::error::CommandError;
use nitrocup_core::mirror::Mirror;
use nitrocup_core::store::MemoryStore;

#[tokio::test]
async fn only_organizers_may_edit_the_rules() {
    let store = MemoryStore::new();
    let mirror = Mirror::attach(&store);

    let err = set_rules(
        &store,
        &mirror,
        &player("a@example.com"),
        "<p>no rules</p>".to_owned(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CommandError::Unauthorized(_)));
    assert!(mirror.rules().is_none());
}

#[tokio::test]
async fn rules_markup_is_persisted_verbatim() {
    let store = MemoryStore::new();
    let mirror = Mirror::attach(&store);

    let markup = "<h1>Nitro Cup</h1><p>Best of <b>five</b>, no forfeits.</p>";
    set_rules(&store, &mirror, &organizer(), markup.to_owned())
        .await
        .unwrap();
    assert_eq!(mirror.rules().unwrap().html, markup);

    // Editing again overwrites the same single document.
    set_rules(&store, &mirror, &organizer(), "<p>v2</p>".to_owned())
        .await
        .unwrap();
    let rules = mirror.rules().unwrap();
    assert_eq!(rules.html, "<p>v2</p>");
}
