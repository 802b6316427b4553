//! End-to-end scenarios over the state machines with an in-memory API.

use solvr_core::actions::{
    ActionOutcome, create_task, fund_task, submit_solution, submit_vote,
};
use solvr_core::api::{ApiError, TaskApi, TaskFilter, UserVoteMetrics};
use solvr_core::auth::{Anonymous, Permissions, StaticAuth};
use solvr_core::error::ErrorCode;
use solvr_core::ledger::{LedgerError, VotingLedger};
use solvr_core::model::{Entity, TaskKind, TaskStatus};
use solvr_core::notify::{NoticeLevel, NoticeLog};
use solvr_core::reconcile::{FetchOutcome, PagedList};
use solvr_core::validate::{FundDraft, SolutionDraft, TaskDraft, ValidationError};

use generators::*;

mod common;
use common::{FakeApi, transport_error};

fn ids<T: Entity, F>(list: &PagedList<T, F>) -> Vec<String> {
    list.items().iter().map(|e| e.id().to_string()).collect()
}

fn ledger_with(rights: u64) -> VotingLedger {
    let mut ledger = VotingLedger::new();
    ledger.set_initial_rights(Some(rights));
    ledger
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

#[test]
fn overlapping_pages_merge_and_block_further_loads() {
    let api = FakeApi::new();
    api.push_solutions(Ok(page_of(
        vec![solution("A", 0), solution("B", 0)],
        1,
        Some(2),
    )));
    api.push_solutions(Ok(page_of(
        vec![solution("B", 1), solution("C", 0)],
        2,
        None,
    )));

    let mut log = NoticeLog::new();
    let mut list = PagedList::new("solutions", "t-1");
    let mut source = |task_id: &&str, page| api.list_solutions(task_id, page);

    assert_eq!(list.initialize(&mut source, &mut log), FetchOutcome::Applied);
    assert_eq!(list.load_next_page(&mut source, &mut log), FetchOutcome::Applied);
    assert_eq!(ids(&list), ["A", "B", "C"]);
    assert_eq!(list.state().get("B").map(|s| s.total_votes), Some(1));
    assert_eq!(list.state().next_page(), None);

    assert_eq!(list.load_next_page(&mut source, &mut log), FetchOutcome::Skipped);
    assert_eq!(api.list_calls.get(), 2);
    assert!(log.notices().is_empty());
}

#[test]
fn first_page_failure_leaves_empty_list_with_error() {
    let api = FakeApi::new();
    api.push_tasks(Err(transport_error()));
    api.push_tasks(Ok(page_of_tasks()));

    let mut log = NoticeLog::new();
    let mut list = PagedList::new("tasks", TaskFilter::default());
    let mut source = |filter: &TaskFilter, page| api.list_tasks(filter, page);

    assert_eq!(list.initialize(&mut source, &mut log), FetchOutcome::Failed);
    assert!(list.items().is_empty());
    assert!(list.has_error());
    assert!(!list.is_loading());
    assert_eq!(log.errors(), 1);

    // Nothing retries on its own, even when asked for more.
    assert_eq!(list.load_next_page(&mut source, &mut log), FetchOutcome::Skipped);
    assert_eq!(api.list_calls.get(), 1);
}

fn page_of_tasks() -> solvr_core::model::Page<solvr_core::model::Task> {
    solvr_core::model::Page::new(
        vec![task("t-1", "owner", TaskKind::Community, TaskStatus::Active)],
        solvr_core::model::Pagination::single(1, None),
    )
}

#[test]
fn result_for_an_abandoned_filter_is_dropped() {
    let mut log = NoticeLog::new();
    let mut list = PagedList::new("tasks", TaskFilter::default());
    let stale = list.begin_initialize();

    let ended = TaskFilter {
        status: Some(TaskStatus::Ended),
        kind: None,
    };
    let fresh = list.begin_set_filter(ended.clone());

    // The older request resolves last; it must not win.
    let fresh_page = page_of_tasks();
    assert_eq!(
        list.complete(fresh, Ok(fresh_page), &mut log),
        FetchOutcome::Applied
    );
    let mut stale_page = page_of_tasks();
    stale_page.data[0].id = "t-stale".into();
    assert_eq!(
        list.complete(stale, Ok(stale_page), &mut log),
        FetchOutcome::Discarded
    );
    assert_eq!(ids(&list), ["t-1"]);
    assert_eq!(list.filter(), &ended);
}

#[test]
fn deleted_tasks_are_kept_but_hidden() {
    let mut log = NoticeLog::new();
    let mut list = PagedList::new("tasks", TaskFilter::default());
    let ticket = list.begin_initialize();
    let page = solvr_core::model::Page::new(
        vec![
            task("t-1", "o", TaskKind::Community, TaskStatus::Active),
            task("t-2", "o", TaskKind::Community, TaskStatus::Deleted),
        ],
        solvr_core::model::Pagination::single(1, None),
    );
    list.complete(ticket, Ok(page), &mut log);
    let shown: Vec<_> = list
        .state()
        .visible(|t| !t.status.is_deleted())
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(shown, ["t-1"]);
    assert_eq!(list.items().len(), 2);
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[test]
fn vote_takes_authoritative_rights() {
    let api = FakeApi::new();
    api.push_vote(Ok(750));
    let mut ledger = ledger_with(1000);

    let request = ledger.prepare_vote("S1", 250).unwrap();
    ledger.cast_vote(&api, &request).unwrap();

    assert_eq!(ledger.remaining_rights(), Some(750));
    assert!(ledger.has_voted("S1"));
    assert_eq!(ledger.voted().len(), 1);
}

#[test]
fn successful_vote_matches_server_even_when_it_disagrees() {
    let api = FakeApi::new();
    api.push_vote(Ok(400));
    let mut ledger = ledger_with(1000);
    let request = ledger.prepare_vote("S2", 100).unwrap();
    ledger.cast_vote(&api, &request).unwrap();
    assert_eq!(ledger.remaining_rights(), Some(400));
    assert!(ledger.has_voted("S2"));
}

#[test]
fn rejected_vote_changes_nothing() {
    let api = FakeApi::new();
    api.push_vote(Err(ApiError::Business {
        message: "voting closed".into(),
    }));
    let mut ledger = ledger_with(1000);
    ledger.record_counts(&[solution("S1", 10)]);

    let request = ledger.prepare_vote("S1", 250).unwrap();
    let err = ledger.cast_vote(&api, &request).unwrap_err();
    assert!(matches!(err, LedgerError::Api(ApiError::Business { .. })));
    assert_eq!(ledger.remaining_rights(), Some(1000));
    assert!(!ledger.has_voted("S1"));
    assert_eq!(ledger.vote_count("S1"), Some(10));
}

#[test]
fn ledger_seeded_from_metrics_and_permissions() {
    let api = FakeApi::new();
    *api.metrics.borrow_mut() = UserVoteMetrics {
        voting_rights: Some(300),
        total_votes: 0,
        voted_solution_ids: vec!["S9".into()],
    };
    let personal = task("t-1", "owner", TaskKind::Personal, TaskStatus::Active);
    let metrics = api.voting_metrics("t-1").unwrap();

    let owner = VotingLedger::from_metrics(&Permissions::for_task(Some("owner"), &personal), &metrics);
    assert_eq!(owner.remaining_rights(), Some(300));
    assert!(!owner.can_vote("S9", "someone", Some("owner")));

    let stranger =
        VotingLedger::from_metrics(&Permissions::for_task(Some("stranger"), &personal), &metrics);
    assert_eq!(stranger.remaining_rights(), None);
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[test]
fn vote_action_without_session_is_disabled() {
    let api = FakeApi::new();
    let mut log = NoticeLog::new();
    let mut ledger = ledger_with(100);
    let outcome = submit_vote(&Anonymous, &api, &mut log, &mut ledger, &solution("S1", 0), 10);
    assert_eq!(outcome, ActionOutcome::Disabled(ErrorCode::Unauthenticated));
    assert_eq!(api.vote_calls.get(), 0);
    assert_eq!(log.notices()[0].level, NoticeLevel::Info);
}

#[test]
fn vote_action_blocks_self_vote() {
    let api = FakeApi::new();
    let mut log = NoticeLog::new();
    let mut ledger = ledger_with(100);
    let own = solution("S1", 0);
    let auth = StaticAuth::with_token("tok", own.created_by.clone());
    let outcome = submit_vote(&auth, &api, &mut log, &mut ledger, &own, 10);
    assert_eq!(outcome, ActionOutcome::Disabled(ErrorCode::SelfVote));
    assert_eq!(api.vote_calls.get(), 0);
}

#[test]
fn vote_action_refuses_overdraw_locally() {
    let api = FakeApi::new();
    let mut log = NoticeLog::new();
    let mut ledger = ledger_with(100);
    let auth = StaticAuth::with_token("tok", "me");
    let outcome = submit_vote(&auth, &api, &mut log, &mut ledger, &solution("S1", 0), 101);
    assert_eq!(outcome.code(), Some(ErrorCode::InsufficientRights));
    assert_eq!(api.vote_calls.get(), 0);
    assert_eq!(log.errors(), 1);
}

#[test]
fn vote_action_success_notifies_and_commits() {
    let api = FakeApi::new();
    api.push_vote(Ok(90));
    let mut log = NoticeLog::new();
    let mut ledger = ledger_with(100);
    let auth = StaticAuth::with_token("tok", "me");
    let outcome = submit_vote(&auth, &api, &mut log, &mut ledger, &solution("S1", 0), 10);
    assert!(outcome.is_done());
    assert_eq!(ledger.remaining_rights(), Some(90));
    assert_eq!(log.notices()[0].level, NoticeLevel::Success);
}

#[test]
fn vote_action_failure_is_a_notice_not_a_crash() {
    let api = FakeApi::new();
    api.push_vote(Err(transport_error()));
    let mut log = NoticeLog::new();
    let mut ledger = ledger_with(100);
    let auth = StaticAuth::with_token("tok", "me");
    let outcome = submit_vote(&auth, &api, &mut log, &mut ledger, &solution("S1", 0), 10);
    assert_eq!(outcome.code(), Some(ErrorCode::TransportFailed));
    assert_eq!(ledger.remaining_rights(), Some(100));
    assert_eq!(log.errors(), 1);
}

#[test]
fn created_solution_shows_first_then_fetch_supersedes() {
    let api = FakeApi::new();
    api.push_solutions(Ok(page_of(vec![solution("S1", 0)], 1, Some(2))));
    let open = task("t-1", "owner", TaskKind::Community, TaskStatus::Active);
    let auth = StaticAuth::with_token("tok", "me");
    let mut log = NoticeLog::new();
    let mut list = PagedList::new("solutions", "t-1");
    let mut source = |task_id: &&str, page| api.list_solutions(task_id, page);
    list.initialize(&mut source, &mut log);

    let draft = SolutionDraft {
        content: "Use a bloom filter".into(),
    };
    let outcome = submit_solution(&auth, &api, &mut log, &mut list, &open, &draft);
    assert!(outcome.is_done());
    assert_eq!(ids(&list), ["s-new", "S1"]);

    api.push_solutions(Ok(page_of(vec![solution("s-new", 5)], 2, None)));
    list.load_next_page(&mut source, &mut log);
    assert_eq!(ids(&list), ["S1", "s-new"]);
    assert_eq!(list.state().get("s-new").map(|s| s.total_votes), Some(5));
}

#[test]
fn owner_cannot_submit_to_own_task() {
    let api = FakeApi::new();
    let own = task("t-1", "me", TaskKind::Community, TaskStatus::Active);
    let auth = StaticAuth::with_token("tok", "me");
    let mut log = NoticeLog::new();
    let mut list = PagedList::new("solutions", "t-1");
    let draft = SolutionDraft {
        content: "mine".into(),
    };
    let outcome = submit_solution(&auth, &api, &mut log, &mut list, &own, &draft);
    assert_eq!(outcome, ActionOutcome::Disabled(ErrorCode::NotPermitted));
    assert_eq!(api.mutate_calls.get(), 0);
}

#[test]
fn invalid_task_draft_never_reaches_api() {
    let api = FakeApi::new();
    let auth = StaticAuth::with_token("tok", "me");
    let mut log = NoticeLog::new();
    let mut list = PagedList::new("tasks", TaskFilter::default());
    let draft = TaskDraft {
        title: "   ".into(),
        description: "body".into(),
        kind: TaskKind::Community,
        deadline: None,
        initial_fund: None,
    };
    let outcome = create_task(&auth, &api, &mut log, &mut list, &draft);
    assert!(matches!(
        outcome,
        ActionOutcome::Invalid(ValidationError::Empty { .. })
    ));
    assert_eq!(api.mutate_calls.get(), 0);
    assert_eq!(log.errors(), 1);
}

#[test]
fn created_task_goes_to_head() {
    let api = FakeApi::new();
    let auth = StaticAuth::with_token("tok", "me");
    let mut log = NoticeLog::new();
    let mut list = PagedList::new("tasks", TaskFilter::default());
    let ticket = list.begin_initialize();
    list.complete(ticket, Ok(page_of_tasks()), &mut log);

    let draft = TaskDraft {
        title: "Port the parser".into(),
        description: "Needs a streaming lexer".into(),
        kind: TaskKind::Personal,
        deadline: None,
        initial_fund: Some(50),
    };
    let outcome = create_task(&auth, &api, &mut log, &mut list, &draft);
    assert!(outcome.is_done());
    assert_eq!(ids(&list), ["t-new", "t-1"]);
}

#[test]
fn funding_replaces_listed_task() {
    let api = FakeApi::new();
    let auth = StaticAuth::with_token("tok", "me");
    let mut log = NoticeLog::new();
    let mut list = PagedList::new("tasks", TaskFilter::default());
    let ticket = list.begin_initialize();
    list.complete(ticket, Ok(page_of_tasks()), &mut log);

    let listed = list.items()[0].clone();
    let mut funded = listed.clone();
    funded.metrics.total_funds = 500;
    *api.fund_result.borrow_mut() = Some(Ok(funded));

    let outcome = fund_task(&auth, &api, &mut log, &mut list, &listed, &FundDraft { amount: 500 });
    assert!(outcome.is_done());
    assert_eq!(list.items()[0].metrics.total_funds, 500);
    assert_eq!(list.items().len(), 1);
}

#[test]
fn funding_zero_is_invalid() {
    let api = FakeApi::new();
    let auth = StaticAuth::with_token("tok", "me");
    let mut log = NoticeLog::new();
    let mut list = PagedList::new("tasks", TaskFilter::default());
    let open = task("t-1", "owner", TaskKind::Community, TaskStatus::Active);
    let outcome = fund_task(&auth, &api, &mut log, &mut list, &open, &FundDraft { amount: 0 });
    assert!(matches!(
        outcome,
        ActionOutcome::Invalid(ValidationError::NotPositive { .. })
    ));
    assert_eq!(api.mutate_calls.get(), 0);
}

// --- debounced username check ---

#[test]
fn only_the_settled_username_is_checked() {
    use solvr_core::debounce::{DEFAULT_QUIET, Debouncer};
    use solvr_core::validate::validate_username;
    use std::time::{Duration, Instant};

    let api = FakeApi::default();
    let mut debouncer = Debouncer::new(DEFAULT_QUIET);
    let start = Instant::now();
    let step = Duration::from_millis(100);

    // Typing "taken" one key at a time never settles long enough.
    for (i, prefix) in ["t", "ta", "tak", "take", "taken"].iter().enumerate() {
        let now = start + step * u32::try_from(i).unwrap();
        debouncer.input((*prefix).to_string(), now);
        assert!(debouncer.poll(now).is_none());
    }

    let settled = start + step * 4 + DEFAULT_QUIET;
    let ticket = debouncer.poll(settled).expect("input has settled");
    assert_eq!(ticket.query, "taken");
    assert!(debouncer.poll(settled).is_none(), "one query per settled input");

    // The user edits again before the answer arrives: the answer is dropped.
    let name = validate_username(&ticket.query).unwrap();
    let answer = api.username_available(&name);
    debouncer.input("taken_2".to_string(), settled + step);
    assert_eq!(debouncer.resolve(&ticket, answer), None);

    let later = settled + step + DEFAULT_QUIET;
    let ticket = debouncer.poll(later).expect("second input settles");
    let answer = api.username_available(&ticket.query);
    assert_eq!(debouncer.resolve(&ticket, answer), Some(Ok(true)));
}
