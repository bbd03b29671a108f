use qna_core::db::open_db_in_memory;
use qna_core::{
    Answer, AnswerStore, DeleteHistoryRecorder, PageRequest, Question, QuestionDraft,
    QuestionStore, RepoError, SqliteAnswerStore, SqliteDeleteHistoryRecorder,
    SqliteQuestionStore, SqliteUserStore, User, UserStore, ValidationError,
};
use rusqlite::Connection;

fn javajigi(conn: &Connection) -> User {
    SqliteUserStore::new(conn)
        .create("javajigi", "Jaesung", Some("javajigi@slipp.net"))
        .unwrap()
}

fn page_ids(page: &[Question]) -> Vec<i64> {
    page.iter().map(|question| question.id.unwrap()).collect()
}

fn new_question(writer: &User, title: &str) -> Question {
    Question::from_draft(writer.clone(), &QuestionDraft::new(title, "body")).unwrap()
}

#[test]
fn user_store_creates_and_finds_users() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserStore::new(&conn);

    let created = users.create(" javajigi ", "Jaesung", None).unwrap();
    assert_eq!(created.login, "javajigi");
    assert_eq!(users.find_by_id(created.id).unwrap(), Some(created.clone()));
    assert_eq!(users.find_by_login("javajigi").unwrap(), Some(created));
    assert!(users.find_by_login("nobody").unwrap().is_none());
    assert!(users.create("javajigi", "duplicate", None).is_err());
}

#[test]
fn question_save_inserts_then_updates() {
    let conn = open_db_in_memory().unwrap();
    let writer = javajigi(&conn);
    let store = SqliteQuestionStore::new(&conn);

    let mut saved = store.save(&new_question(&writer, "first title")).unwrap();
    let id = saved.id.unwrap();
    assert_eq!(saved.writer, writer);
    assert!(saved.created_at.is_some());

    saved.title = "second title".to_string();
    saved.deleted = true;
    let updated = store.save(&saved).unwrap();
    assert_eq!(updated.id, Some(id));
    assert_eq!(updated.title, "second title");
    assert!(updated.deleted);

    let loaded = store.find_by_id(id).unwrap().unwrap();
    assert!(loaded.deleted, "find_by_id returns tombstoned rows");
}

#[test]
fn question_save_with_unknown_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let writer = javajigi(&conn);
    let store = SqliteQuestionStore::new(&conn);

    let mut ghost = new_question(&writer, "ghost title");
    ghost.id = Some(404);
    let err = store.save(&ghost).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "question",
            id: 404
        }
    ));
}

#[test]
fn question_save_rejects_invalid_title() {
    let conn = open_db_in_memory().unwrap();
    let writer = javajigi(&conn);
    let store = SqliteQuestionStore::new(&conn);

    let mut question = new_question(&writer, "valid title");
    question.title = "no".to_string();
    let err = store.save(&question).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::TitleLength { chars: 2 })
    ));
}

#[test]
fn find_by_deleted_and_count_split_on_tombstone() {
    let conn = open_db_in_memory().unwrap();
    let writer = javajigi(&conn);
    let store = SqliteQuestionStore::new(&conn);

    let live = store.save(&new_question(&writer, "live question")).unwrap();
    let mut gone = store.save(&new_question(&writer, "gone question")).unwrap();
    gone.deleted = true;
    store.save(&gone).unwrap();

    let visible = store.find_by_deleted(false).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, live.id);
    assert_eq!(store.find_by_deleted(true).unwrap()[0].id, gone.id);
    assert_eq!(store.count_by_deleted(false).unwrap(), 1);
    assert_eq!(store.count_by_deleted(true).unwrap(), 1);
}

#[test]
fn find_page_skips_deleted_and_is_id_ordered() {
    let conn = open_db_in_memory().unwrap();
    let writer = javajigi(&conn);
    let store = SqliteQuestionStore::new(&conn);

    let mut ids = Vec::new();
    for n in 0..5 {
        let saved = store
            .save(&new_question(&writer, &format!("question {n}")))
            .unwrap();
        ids.push(saved.id.unwrap());
    }
    let mut second = store.find_by_id(ids[1]).unwrap().unwrap();
    second.deleted = true;
    store.save(&second).unwrap();

    let first_page = store.find_page(&PageRequest::new(0, Some(2))).unwrap();
    let second_page = store.find_page(&PageRequest::new(1, Some(2))).unwrap();
    let third_page = store.find_page(&PageRequest::new(2, Some(2))).unwrap();

    assert_eq!(page_ids(&first_page), vec![ids[0], ids[2]]);
    assert_eq!(page_ids(&second_page), vec![ids[3], ids[4]]);
    assert!(third_page.is_empty());
}

#[test]
fn answers_are_loaded_with_their_question_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let writer = javajigi(&conn);
    let questions = SqliteQuestionStore::new(&conn);
    let answers = SqliteAnswerStore::new(&conn);

    let mut question = questions.save(&new_question(&writer, "with answers")).unwrap();
    for contents in ["first", "second"] {
        let mut answer = Answer::new(writer.clone(), contents).unwrap();
        question.add_answer(&mut answer).unwrap();
        answers.save(&answer).unwrap();
    }

    let reloaded = questions.find_by_id(question.id.unwrap()).unwrap().unwrap();
    let contents: Vec<_> = reloaded.answers.iter().map(|a| a.contents.as_str()).collect();
    assert_eq!(contents, vec!["first", "second"]);
    assert_eq!(
        answers.find_by_question(question.id.unwrap()).unwrap(),
        reloaded.answers
    );
}

#[test]
fn answer_save_requires_question_link() {
    let conn = open_db_in_memory().unwrap();
    let writer = javajigi(&conn);
    let answers = SqliteAnswerStore::new(&conn);

    let detached = Answer::new(writer, "orphan").unwrap();
    assert!(matches!(
        answers.save(&detached),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn history_recorder_snapshots_question_and_answers() {
    let conn = open_db_in_memory().unwrap();
    let writer = javajigi(&conn);
    let questions = SqliteQuestionStore::new(&conn);
    let answers = SqliteAnswerStore::new(&conn);
    let recorder = SqliteDeleteHistoryRecorder::new(&conn);

    let mut question = questions.save(&new_question(&writer, "to be deleted")).unwrap();
    let mut answer = Answer::new(writer.clone(), "self answer").unwrap();
    question.add_answer(&mut answer).unwrap();
    let answer = answers.save(&answer).unwrap();

    let mut question = questions.find_by_id(question.id.unwrap()).unwrap().unwrap();
    question.delete(&writer).unwrap();
    let history_id = recorder.save_all(&question, &writer).unwrap();

    let histories = recorder.find_by_question(question.id.unwrap()).unwrap();
    assert_eq!(histories.len(), 1);
    let history = &histories[0];
    assert_eq!(history.uuid, history_id);
    assert_eq!(history.deleted_by, writer.id);
    assert_eq!(history.title, "to be deleted");
    assert_eq!(history.answers.len(), 1);
    assert_eq!(history.answers[0].answer_id, answer.id.unwrap());
    assert_eq!(history.answers[0].contents, "self answer");
}

#[test]
fn history_recorder_refuses_live_questions() {
    let conn = open_db_in_memory().unwrap();
    let writer = javajigi(&conn);
    let questions = SqliteQuestionStore::new(&conn);
    let recorder = SqliteDeleteHistoryRecorder::new(&conn);

    let question = questions.save(&new_question(&writer, "still live")).unwrap();
    assert!(matches!(
        recorder.save_all(&question, &writer),
        Err(RepoError::InvalidData(_))
    ));
    assert!(recorder
        .find_by_question(question.id.unwrap())
        .unwrap()
        .is_empty());
}
