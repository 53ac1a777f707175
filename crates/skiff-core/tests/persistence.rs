mod common;

use std::sync::Arc;

use common::{order, url, Harness, Recorder, RecordingFactory};
use skiff_core::{
    AddTab, Config, MemorySessionStore, ScopeId, SessionStore, TabManager, TabSettings,
};

#[test]
fn test_pending_snapshots_coalesce() {
    let mut h = Harness::new();
    for name in ["a", "b", "c"] {
        h.manager
            .add_tab(AddTab::for_url(url(&format!("https://{name}.example/"))));
    }
    assert_eq!(h.store.save_count(), 0);

    assert!(h.manager.flush_persistence());
    assert_eq!(h.store.save_count(), 1);
    assert!(!h.manager.flush_persistence());

    let snapshot = h.store.load(h.manager.scope()).unwrap().unwrap();
    assert_eq!(snapshot.tabs.len(), 3);
    assert_eq!(
        snapshot.tabs.iter().map(|t| t.id).collect::<Vec<_>>(),
        order(&h.manager)
    );
}

#[test]
fn test_quiet_add_does_not_persist() {
    let mut h = Harness::new();
    h.manager
        .add_tab(AddTab::for_url(url("https://quiet.example/")).quiet());
    assert!(!h.manager.flush_persistence());
}

#[test]
fn test_snapshot_reflects_selection_and_partition() {
    let mut h = Harness::new();
    let normal = h.manager.add_tab(AddTab::for_url(url("https://n.example/")));
    let private = h
        .manager
        .add_tab(AddTab::for_url(url("https://p.example/")).incognito(true));
    h.manager.select_tab(Some(private), true);
    h.manager.flush_persistence();

    let snapshot = h.store.load(h.manager.scope()).unwrap().unwrap();
    assert!(snapshot.incognito);
    assert_eq!(snapshot.selected, Some(private));
    assert_eq!(snapshot.selected_tab().map(|t| t.id), Some(private));
    assert_eq!(snapshot.tabs[0].id, normal);
    assert_eq!(snapshot.tabs[1].tab_index, Some(1));
}

#[test]
fn test_restore_from_memory_store() {
    let store = Arc::new(MemorySessionStore::new());
    let (a, b, closed) = {
        let mut h = Harness::with_store(TabSettings::default(), Arc::clone(&store));
        let a = h.manager.add_tab(AddTab::for_url(url("https://a.example/")));
        let b = h
            .manager
            .add_tab(AddTab::for_url(url("https://b.example/")).with_parent(a));
        let closed = h.manager.add_tab(AddTab::for_url(url("https://gone.example/")));
        h.manager.select_tab(Some(b), true);
        h.manager.remove_tab(closed, false);
        assert!(h.manager.flush_persistence());
        (a, b, closed)
    };

    let mut h = Harness::with_store(TabSettings::default(), store);
    assert!(h.manager.restore_tabs(false));

    assert_eq!(order(&h.manager), vec![a, b]);
    assert_eq!(h.manager.selected_tab_id(), Some(b));
    assert_eq!(h.manager.tab(b).unwrap().parent, Some(a));
    assert!(h.manager.tab(a).unwrap().is_zombie());
    assert!(!h.manager.tab(b).unwrap().is_zombie());
    assert_eq!(h.renderer.loads_for(b), vec![url("https://b.example/")]);

    let undo = h.manager.recently_closed().batches().next().unwrap();
    assert_eq!(undo[0].id, closed);

    // Not forced, and tabs exist now
    assert!(!h.manager.restore_tabs(false));
}

#[test]
fn test_forced_restore_replaces_undo_stack() {
    let store = Arc::new(MemorySessionStore::new());
    let (kept, closed) = {
        let mut h = Harness::with_store(TabSettings::default(), Arc::clone(&store));
        let kept = h.manager.add_tab(AddTab::for_url(url("https://kept.example/")));
        let closed = h.manager.add_tab(AddTab::for_url(url("https://closed.example/")));
        h.manager.remove_tab(closed, false);
        assert!(h.manager.flush_persistence());
        (kept, closed)
    };

    let mut h = Harness::with_store(TabSettings::default(), store);
    let live = h.manager.add_tab(AddTab::for_url(url("https://live.example/")));
    let dropped = h.manager.add_tab(AddTab::for_url(url("https://dropped.example/")));
    h.manager.remove_tab(dropped, false);

    assert!(!h.manager.restore_tabs(false));
    assert!(h.manager.restore_tabs(true));

    assert_eq!(order(&h.manager), vec![live, kept]);
    assert_eq!(h.manager.selected_tab_id(), Some(kept));
    let batches: Vec<_> = h.manager.recently_closed().batches().collect();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].id, closed);
    assert!(h
        .manager
        .recently_closed_tab_for_url(&url("https://dropped.example/"))
        .is_none());
}

#[test]
fn test_restore_drops_incognito_when_configured() {
    let store = Arc::new(MemorySessionStore::new());
    let normal = {
        let mut h = Harness::with_store(TabSettings::default(), Arc::clone(&store));
        let normal = h.manager.add_tab(AddTab::for_url(url("https://n.example/")));
        let private = h
            .manager
            .add_tab(AddTab::for_url(url("https://p.example/")).incognito(true));
        h.manager.select_tab(Some(private), true);
        h.manager.flush_persistence();
        normal
    };

    let settings = TabSettings {
        close_incognito_tabs: true,
        ..TabSettings::default()
    };
    let mut h = Harness::with_store(settings, store);
    assert!(h.manager.restore_tabs(false));

    // The recorded private selection is gone; the normal tab takes over
    assert_eq!(h.manager.selected_tab_id(), Some(normal));
    assert_eq!(h.manager.incognito_tabs().count(), 0);
    assert_eq!(h.manager.len(), 1);
    assert!(!h.manager.is_incognito());
    assert!(!h.manager.selected_tab().unwrap().is_incognito());
    assert!(!h.manager.tab(normal).unwrap().is_zombie());
}

#[test]
fn test_restore_without_snapshot() {
    let mut h = Harness::new();
    assert!(!h.manager.restore_tabs(true));
    assert!(h.manager.is_empty());
}

#[test]
fn test_clear_archive() {
    let mut h = Harness::new();
    h.manager.add_tab(AddTab::for_url(url("https://a.example/")));
    h.manager.flush_persistence();
    assert!(h.store.load(h.manager.scope()).unwrap().is_some());

    h.manager.clear_archive().unwrap();
    assert!(h.store.load(h.manager.scope()).unwrap().is_none());
}

#[test]
fn test_sqlite_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = Config::new(dir.path().to_path_buf()).with_scope(ScopeId::new("window-1"));

    let (a, b) = {
        let renderer = Arc::new(Recorder::default());
        let mut manager = TabManager::open(&config, Arc::new(RecordingFactory(renderer)))?;
        let a = manager.add_tab(AddTab::for_url(url("https://a.example/")));
        let b = manager.add_tab(AddTab::for_url(url("https://b.example/")).with_parent(a));
        manager.toggle_pinned(a);
        manager.select_tab(Some(b), true);
        assert!(manager.flush_persistence());
        (a, b)
    };

    let renderer = Arc::new(Recorder::default());
    let mut manager = TabManager::open(&config, Arc::new(RecordingFactory(Arc::clone(&renderer))))?;
    assert!(manager.restore_tabs(false));

    assert_eq!(order(&manager), vec![a, b]);
    assert_eq!(manager.selected_tab_id(), Some(b));
    assert!(manager.tab(a).unwrap().is_pinned);
    assert_eq!(manager.tab(b).unwrap().parent, Some(a));
    assert_eq!(renderer.loads_for(b), vec![url("https://b.example/")]);

    // Another scope in the same database starts empty
    let other = config.clone().with_scope(ScopeId::new("window-2"));
    let mut manager = TabManager::open(&other, Arc::new(RecordingFactory(renderer)))?;
    assert!(!manager.restore_tabs(false));
    Ok(())
}

#[test]
fn test_corrupt_snapshot_is_not_restored() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = Config::new(dir.path().to_path_buf());

    {
        let db = skiff_core::Database::open(&config.database_path)?;
        db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO session_snapshots (scope_id, payload, saved_at) VALUES (?1, 'not json', '')",
                [config.scope.as_str()],
            )?;
            Ok(())
        })?;
    }

    let mut manager = TabManager::open(&config, Arc::new(RecordingFactory(Arc::default())))?;
    assert!(!manager.restore_tabs(false));
    assert!(!manager.restore_tabs(true));
    assert!(manager.is_empty());
    assert_eq!(manager.selected_tab_id(), None);
    assert!(manager.recently_closed().is_empty());

    // The next snapshot replaces the unreadable one
    let a = manager.add_tab(AddTab::for_url(url("https://a.example/")));
    assert!(manager.flush_persistence());
    let mut reopened = TabManager::open(&config, Arc::new(RecordingFactory(Arc::default())))?;
    assert!(reopened.restore_tabs(false));
    assert_eq!(order(&reopened), vec![a]);
    Ok(())
}

#[test]
fn test_stored_settings_override_config() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = Config::new(dir.path().to_path_buf());

    let db = skiff_core::Database::open(&config.database_path)?;
    let stored = TabSettings {
        max_crash_reloads: 1,
        ..TabSettings::default()
    };
    stored.save(&db)?;

    let manager = TabManager::open(&config, Arc::new(RecordingFactory(Arc::default())))?;
    assert_eq!(manager.settings().max_crash_reloads, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_background_worker_writes_snapshots() {
    let mut h = Harness::new();
    let worker = h.manager.spawn_persistence(&tokio::runtime::Handle::current());

    h.manager.add_tab(AddTab::for_url(url("https://bg.example/")));

    let mut written = false;
    for _ in 0..100 {
        if h.store.save_count() > 0 {
            written = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(written);
    worker.abort();
}
