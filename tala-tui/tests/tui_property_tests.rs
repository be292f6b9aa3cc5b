use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use proptest::prelude::*;
use std::time::Duration;
use tala_api::{ApiError, TokenPair};
use tala_core::{form_schema, page_len, FieldValue, FormKind, Page, Record};
use tala_tui::api_client::{ApiClientError, FormsClient};
use tala_tui::config::{AuthConfig, ThemeConfig, TuiConfig};
use tala_tui::error_log::ErrorLogStore;
use tala_tui::keys::{map_editing_key, map_key, Action};
use tala_tui::notifications::NotificationLevel;
use tala_tui::session::Session;
use tala_tui::state::{App, DrawerState, GridState, MigratorState, MigratorStatus, Pager, ReportState};

fn base_config() -> TuiConfig {
    TuiConfig {
        api_base_url: "http://localhost:8080".to_string(),
        auth: AuthConfig {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        },
        request_timeout_ms: 5_000,
        tick_interval_ms: 250,
        token_refresh_interval_ms: 300_000,
        idle_threshold_ms: 900_000,
        page_size_options: vec![10, 20, 50, 100],
        migrator_inbox_path: "tmp/tala-inbox.json".into(),
        persistence_path: "tmp/tala-ui.json".into(),
        error_log_path: "tmp/tala-errors.jsonl".into(),
        log_path: "tmp/tala.log".into(),
        theme: ThemeConfig {
            name: "terra".to_string(),
        },
    }
}

fn page_of(count: usize, total: u64, page: u64, limit: u64) -> Page {
    let records = (0..count)
        .map(|i| {
            let mut record = Record::new().with("calendar_year", FieldValue::Number(2024.0));
            record.id = Some(format!("id-{i}"));
            record
        })
        .collect();
    Page {
        records,
        total,
        page,
        limit,
    }
}

#[test]
fn config_requires_tokens() {
    let mut config = base_config();
    config.auth.access_token = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn config_requires_known_theme() {
    let mut config = base_config();
    config.theme.name = "synthwave".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn config_requires_idle_threshold_above_refresh_interval() {
    let mut config = base_config();
    config.idle_threshold_ms = config.token_refresh_interval_ms;
    assert!(config.validate().is_err());
}

#[test]
fn stale_page_response_is_dropped() {
    let mut grid = GridState::new(10);
    let stale = grid.pager.begin_fetch();
    let fresh = grid.pager.begin_fetch();

    // The later request resolves first.
    assert!(grid.apply_page(fresh, page_of(3, 3, 1, 10)));
    assert_eq!(grid.records.len(), 3);

    // The slow response for the superseded request must not win.
    assert!(!grid.apply_page(stale, page_of(10, 100, 1, 10)));
    assert_eq!(grid.records.len(), 3);
    assert_eq!(grid.pager.total, 3);
}

#[test]
fn failed_stale_fetch_keeps_loading_flag_of_latest() {
    let mut pager = Pager::new(10);
    let stale = pager.begin_fetch();
    let _fresh = pager.begin_fetch();
    pager.fail(stale);
    assert!(pager.loading);
}

#[test]
fn add_then_refresh_scenario() {
    // Grid shows no records; after a successful insert the refresh yields
    // total=1 and the new record appears.
    let mut grid = GridState::new(10);
    let first = grid.pager.begin_fetch();
    assert!(grid.apply_page(first, page_of(0, 0, 1, 10)));
    assert_eq!(grid.pager.total, 0);

    let mut created = Record::new()
        .with("calendar_year", FieldValue::Number(2024.0))
        .with("province", FieldValue::from("Marinduque"));
    created.id = Some("new".to_string());
    let refresh = grid.pager.begin_fetch();
    assert!(grid.apply_page(
        refresh,
        Page {
            records: vec![created.clone()],
            total: 1,
            page: 1,
            limit: 10,
        }
    ));
    assert_eq!(grid.pager.total, 1);
    assert_eq!(grid.records[0], created);
}

#[test]
fn drawer_submits_exactly_declared_fields() {
    let mut drawer = DrawerState::new(FormKind::Biodiversity4);
    // Pick the first year option for the required calendar_year select.
    drawer.step_option(true);
    let record = drawer.build_record().expect("record should build");

    let schema = form_schema(FormKind::Biodiversity4);
    for key in record.values.keys() {
        assert!(schema.field(key).is_some(), "extraneous key {key}");
    }
    // The read-only province default is carried through.
    assert_eq!(
        record.get("province"),
        Some(&FieldValue::Text("Marinduque".to_string()))
    );
    // Year select options parse into the column's number type.
    assert!(matches!(
        record.get("calendar_year"),
        Some(FieldValue::Number(_))
    ));
    assert!(record.id.is_none());
}

#[test]
fn drawer_requires_calendar_year() {
    let drawer = DrawerState::new(FormKind::Biodiversity4);
    let errors = drawer.build_record().expect_err("required field missing");
    assert!(errors
        .iter()
        .any(|e| e.field == "calendar_year" && e.message == "required"));
}

#[test]
fn migrator_flags_non_numeric_year_before_submission() {
    let mut migrator = MigratorState::new();
    let schema = form_schema(FormKind::Biodiversity12);
    let mut row = std::collections::BTreeMap::new();
    row.insert("calendar_year".to_string(), "abc".to_string());
    row.insert("province".to_string(), "X".to_string());
    migrator.load(schema, vec![row]);

    assert_eq!(migrator.flagged_rows(), 1);
    assert!(migrator.valid_records(schema).is_empty());
}

#[test]
fn migrator_submits_well_formed_rows_only() {
    let mut migrator = MigratorState::new();
    let schema = form_schema(FormKind::Biodiversity12);
    let mut bad = std::collections::BTreeMap::new();
    bad.insert("calendar_year".to_string(), "abc".to_string());
    let mut good = std::collections::BTreeMap::new();
    good.insert("calendar_year".to_string(), "2024".to_string());
    good.insert("province".to_string(), "Marinduque".to_string());
    good.insert("number_of_permits_issued".to_string(), "7".to_string());
    migrator.load(schema, vec![bad, good]);

    let records = migrator.valid_records(schema);
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].get("number_of_permits_issued"),
        Some(&FieldValue::Number(7.0))
    );
}

#[test]
fn batch_422_lands_in_error_log_without_success_toast() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config();
    config.error_log_path = dir.path().join("errors.jsonl");
    let session = Session::shared(
        TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        },
        Duration::from_secs(600),
    );
    let api = FormsClient::new(&config, session.clone()).unwrap();
    let store = ErrorLogStore::new(config.error_log_path.clone());
    let mut app = App::new(config, api, session, store);

    let payload: ApiError = serde_json::from_str(
        r#"{"code":"VALIDATION_FAILED","msg":"Validation failed","errors":[{"row":0,"field":"area","msg":"required"}]}"#,
    )
    .unwrap();
    app.apply_batch_outcome(
        FormKind::Biodiversity12,
        Err(ApiClientError::Api {
            status: 422,
            error: payload.clone(),
        }),
    );

    // The exact payload is captured, no success toast is shown.
    assert_eq!(app.error_log.entries()[0].error, payload);
    assert_eq!(
        app.notifications.last().unwrap().level,
        NotificationLevel::Error
    );
    assert_eq!(app.migrator.status, MigratorStatus::Idle);

    // A plain transport failure stays out of the store.
    app.apply_batch_outcome(
        FormKind::Biodiversity12,
        Err(ApiClientError::InvalidResponse("HTTP 500: boom".to_string())),
    );
    assert_eq!(app.error_log.len(), 1);
}

#[test]
fn report_filters_are_anded_and_blank_free() {
    let mut report = ReportState::new(FormKind::Biodiversity4, 10);
    report.filters[1].value = "Marinduque".to_string();
    report.filters[2].value = "Gasan".to_string();
    let filter = report.filter();
    assert_eq!(filter.len(), 2);
}

proptest! {
    #[test]
    fn changing_limit_resets_page(page in 1u64..50, old_limit in 1u64..200, new_limit in 1u64..200) {
        let mut pager = Pager::new(old_limit);
        pager.total = 10_000;
        pager.page = page;
        pager.set_limit(new_limit);
        if new_limit == old_limit {
            prop_assert_eq!(pager.page, page);
        } else {
            prop_assert_eq!(pager.page, 1);
        }
    }

    #[test]
    fn page_len_matches_pagination_invariant(page in 1u64..100, limit in 1u64..100, total in 0u64..10_000) {
        let len = page_len(page, limit, total);
        if total == 0 {
            prop_assert_eq!(len, 0);
        } else {
            let offset = (page - 1) * limit;
            let expected = if offset >= total { 0 } else { limit.min(total - offset) };
            prop_assert_eq!(len, expected);
            prop_assert!(len <= limit);
        }
    }

    #[test]
    fn page_navigation_stays_in_range(total in 0u64..1000, limit in 1u64..100, steps in proptest::collection::vec(prop::bool::ANY, 0..32)) {
        let mut pager = Pager::new(limit);
        pager.total = total;
        for forward in steps {
            if forward { pager.next_page(); } else { pager.prev_page(); }
            prop_assert!(pager.page >= 1);
            prop_assert!(pager.page <= pager.max_page());
        }
    }

    #[test]
    fn only_latest_generation_is_applied(extra_fetches in 1usize..10) {
        let mut pager = Pager::new(10);
        let first = pager.begin_fetch();
        let mut latest = first;
        for _ in 0..extra_fetches {
            latest = pager.begin_fetch();
        }
        prop_assert!(!pager.apply(first, 100));
        prop_assert!(pager.apply(latest, 100));
        prop_assert_eq!(pager.total, 100);
    }

    #[test]
    fn keybinding_digit_switches_view(digit in 0u8..=9u8) {
        let ch = char::from(b'0' + digit);
        let event = KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE);
        let action = map_key(event);
        match ch {
            '1'..='6' => {
                let index = (digit - 1) as usize;
                prop_assert!(matches!(action, Some(Action::SwitchView(i)) if i == index));
            }
            _ => prop_assert!(action.is_none()),
        }
    }

    #[test]
    fn navigation_keys_consistent(use_vim in prop::bool::ANY) {
        let key = if use_vim {
            KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE)
        } else {
            KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)
        };
        prop_assert!(matches!(map_key(key), Some(Action::MoveDown)));
    }

    #[test]
    fn all_action_keys_mapped(key_char in "[qnedrlsc?=\\[\\]]") {
        let c = key_char.chars().next().unwrap();
        let event = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        prop_assert!(map_key(event).is_some(), "Key '{}' should map to an action", c);
    }

    #[test]
    fn editing_mode_passes_printable_chars_through(c in proptest::char::range('a', 'z')) {
        let event = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        prop_assert!(matches!(map_editing_key(event), Some(Action::Input(ch)) if ch == c));
    }
}
