use indexmap::IndexMap;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryFilter, Set,
};
use serde_json::json;

use survey_groups::database::entities::{
    assessments, conditions, question_groups, questions, surveys,
};
use survey_groups::database::test_utils::setup_test_db;
use survey_groups::errors::GroupError;
use survey_groups::services::session::PAGE_SIZE_STATE;
use survey_groups::services::{
    AdminSession, FlashLevel, GroupChanges, GroupSearch, GroupSort, NewGroup,
    QuestionGroupService,
};

async fn create_survey(
    db: &DatabaseConnection,
    sid: i32,
    additional_languages: &str,
    active: &str,
) -> Result<surveys::Model, DbErr> {
    surveys::ActiveModel {
        sid: Set(sid),
        owner_id: Set(1),
        language: Set("en".to_string()),
        additional_languages: Set(additional_languages.to_string()),
        active: Set(active.to_string()),
    }
    .insert(db)
    .await
}

async fn create_question(
    db: &DatabaseConnection,
    qid: i32,
    language: &str,
    parent_qid: i32,
    sid: i32,
    gid: i32,
) -> Result<questions::Model, DbErr> {
    questions::ActiveModel {
        qid: Set(qid),
        language: Set(language.to_string()),
        parent_qid: Set(parent_qid),
        sid: Set(sid),
        gid: Set(gid),
        title: Set(format!("Q{}", qid)),
        question: Set(format!("Question {}", qid)),
        question_order: Set(qid),
    }
    .insert(db)
    .await
}

async fn create_condition(
    db: &DatabaseConnection,
    qid: i32,
    cqid: i32,
) -> Result<conditions::Model, DbErr> {
    conditions::ActiveModel {
        qid: Set(qid),
        cqid: Set(cqid),
        cfieldname: Set(format!("100X1X{}", cqid)),
        method: Set("==".to_string()),
        value: Set("Y".to_string()),
        scenario: Set(1),
        ..Default::default()
    }
    .insert(db)
    .await
}

async fn create_assessment(
    db: &DatabaseConnection,
    sid: i32,
    gid: i32,
) -> Result<assessments::Model, DbErr> {
    assessments::ActiveModel {
        sid: Set(sid),
        scope: Set("G".to_string()),
        gid: Set(gid),
        language: Set("en".to_string()),
        name: Set("High score".to_string()),
        minimum: Set("10".to_string()),
        maximum: Set("20".to_string()),
        message: Set("Well done".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}

fn translations(sid: i32, names: &[(&str, &str)]) -> IndexMap<String, NewGroup> {
    names
        .iter()
        .map(|(language, name)| (language.to_string(), NewGroup::new(sid, *language, *name)))
        .collect()
}

async fn group_rows(db: &DatabaseConnection, gid: i32) -> Vec<question_groups::Model> {
    question_groups::Entity::find()
        .filter(question_groups::Column::Gid.eq(gid))
        .all(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_insert_record_allocates_sequential_gids() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "", "N").await.unwrap();
    let service = QuestionGroupService::new(db);

    let first = service
        .insert_record(NewGroup::new(100, "en", "Introduction"))
        .await;
    let second = service
        .insert_record(NewGroup::new(100, "en", "Demographics").with_order(1))
        .await;

    assert_eq!(first, Some(1));
    assert_eq!(second, Some(2));
}

#[tokio::test]
async fn test_insert_record_rejects_gid_in_use() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "", "N").await.unwrap();
    let service = QuestionGroupService::new(db);

    let mut group = NewGroup::new(100, "en", "Introduction");
    group.gid = Some(5);
    assert_eq!(service.try_insert_record(group.clone()).await.unwrap(), 5);

    let err = service.try_insert_record(group.clone()).await.unwrap_err();
    let errors = err.field_errors().expect("field errors");
    assert_eq!(errors.get("gid"), ["Gid \"5\" is already in use."]);

    // Same gid in another language is a translation, not a duplicate
    group.language = "de".to_string();
    assert_eq!(service.insert_record(group).await, Some(5));
}

#[tokio::test]
async fn test_insert_record_validates_language_length() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "", "N").await.unwrap();
    let service = QuestionGroupService::new(db);

    let err = service
        .try_insert_record(NewGroup::new(100, "e", "Introduction"))
        .await
        .unwrap_err();

    assert!(err.is_client_error());
    assert_eq!(
        err.field_errors().unwrap().get("language"),
        ["Language is too short (minimum is 2 characters)."]
    );
    assert_eq!(
        service
            .insert_record(NewGroup::new(100, "e", "Introduction"))
            .await,
        None
    );
}

#[tokio::test]
async fn test_insert_record_refused_on_active_survey() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "", "Y").await.unwrap();
    let service = QuestionGroupService::new(db.clone());

    let err = service
        .try_insert_record(NewGroup::new(100, "en", "Late addition"))
        .await
        .unwrap_err();

    assert_eq!(
        err.field_errors().unwrap().get("gid"),
        ["You can not add a group if survey is active."]
    );
    assert_eq!(question_groups::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_insert_record_strips_script_from_name_and_description() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "", "N").await.unwrap();
    let service = QuestionGroupService::new(db.clone());

    let gid = service
        .try_insert_record(
            NewGroup::new(100, "en", "Intro<script>alert(1)</script>")
                .with_description("<p onclick=\"steal()\">Welcome</p>"),
        )
        .await
        .unwrap();

    let rows = group_rows(&db, gid).await;
    assert_eq!(rows[0].group_name, "Intro");
    assert_eq!(rows[0].description.as_deref(), Some("<p>Welcome</p>"));
}

#[tokio::test]
async fn test_insert_new_group_shares_gid_across_languages() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "de fr", "N").await.unwrap();
    let service = QuestionGroupService::new(db.clone());

    let gid = service
        .insert_new_group(translations(
            100,
            &[("fr", "Accueil"), ("en", "Welcome"), ("de", "Willkommen")],
        ))
        .await
        .unwrap()
        .expect("group inserted");

    let rows = group_rows(&db, gid).await;
    assert_eq!(rows.len(), 3);
    let mut languages: Vec<_> = rows.iter().map(|row| row.language.as_str()).collect();
    languages.sort();
    assert_eq!(languages, vec!["de", "en", "fr"]);
    assert!(rows.iter().all(|row| row.sid == 100));
}

#[tokio::test]
async fn test_insert_new_group_requires_every_survey_language() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "de fr", "N").await.unwrap();
    let service = QuestionGroupService::new(db.clone());

    let err = service
        .insert_new_group(translations(100, &[("en", "Welcome"), ("de", "Willkommen")]))
        .await
        .unwrap_err();

    assert!(matches!(err, GroupError::MissingTranslation(ref lang) if lang == "fr"));
    assert_eq!(question_groups::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_insert_new_group_rejects_empty_input_and_unknown_survey() {
    let db = setup_test_db().await.unwrap();
    let service = QuestionGroupService::new(db);

    let err = service.insert_new_group(IndexMap::new()).await.unwrap_err();
    assert!(matches!(err, GroupError::EmptyInput));

    let err = service
        .insert_new_group(translations(404, &[("en", "Welcome")]))
        .await
        .unwrap_err();
    assert!(matches!(err, GroupError::SurveyNotFound(404)));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_insert_new_group_rolls_back_when_a_language_fails() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "de", "N").await.unwrap();
    let service = QuestionGroupService::new(db.clone());

    let mut existing = NewGroup::new(100, "de", "Bestehend");
    existing.gid = Some(5);
    service.try_insert_record(existing).await.unwrap();

    let mut data = translations(100, &[("en", "Welcome"), ("de", "Willkommen")]);
    if let Some(base) = data.get_mut("en") {
        base.gid = Some(5);
    }

    let result = service.insert_new_group(data).await.unwrap();
    assert_eq!(result, None);

    let rows = group_rows(&db, 5).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].language, "de");
    assert_eq!(rows[0].group_name, "Bestehend");
}

#[tokio::test]
async fn test_update_record_changes_one_language() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "de", "Y").await.unwrap();
    question_groups::ActiveModel {
        gid: Set(1),
        language: Set("en".to_string()),
        sid: Set(100),
        group_name: Set("Old".to_string()),
        group_order: Set(0),
        description: Set(None),
        randomization_group: Set(String::new()),
        grelevance: Set(None),
    }
    .insert(&db)
    .await
    .unwrap();
    let service = QuestionGroupService::new(db);

    // Editing is allowed on an active survey
    let updated = service
        .update_record(
            1,
            "en",
            GroupChanges {
                group_name: Some("New".to_string()),
                description: Some(Some("About you".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.group_name, "New");
    assert_eq!(updated.description.as_deref(), Some("About you"));

    let err = service
        .update_record(1, "de", GroupChanges::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GroupError::GroupNotFound { gid: 1, .. }));
}

#[tokio::test]
async fn test_get_groups_uses_base_language_order() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "de", "N").await.unwrap();
    let service = QuestionGroupService::new(db);

    for (order, (en, de)) in [("Second", "Zweite"), ("First", "Erste")].iter().enumerate() {
        let mut data = translations(100, &[("en", *en), ("de", *de)]);
        for group in data.values_mut() {
            group.group_order = 1 - order as i32;
        }
        service.insert_new_group(data).await.unwrap();
    }

    let groups = service.get_groups(100).await.unwrap();
    let names: Vec<_> = groups.iter().map(|g| g.group_name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);
    assert_eq!(groups[0].gid, 2);
}

#[tokio::test]
async fn test_update_group_order_renumbers_all_languages() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "de", "N").await.unwrap();
    let service = QuestionGroupService::new(db.clone());

    for (name, order) in [("C", 5), ("B", 2), ("A", 2)] {
        let mut data = translations(100, &[("en", name), ("de", name)]);
        for group in data.values_mut() {
            group.group_order = order;
        }
        service.insert_new_group(data).await.unwrap();
    }

    let touched = service.update_group_order(100, "en", 1).await.unwrap();
    assert_eq!(touched, 6);

    let rows = service
        .get_all_groups(
            Condition::all().add(question_groups::Column::Sid.eq(100)),
            &[
                (question_groups::Column::GroupOrder, Order::Asc),
                (question_groups::Column::Language, Order::Asc),
            ],
        )
        .await
        .unwrap();

    let ordered: Vec<_> = rows
        .iter()
        .map(|row| (row.group_name.as_str(), row.language.as_str(), row.group_order))
        .collect();
    assert_eq!(
        ordered,
        vec![
            ("A", "de", 1),
            ("A", "en", 1),
            ("B", "de", 2),
            ("B", "en", 2),
            ("C", "de", 3),
            ("C", "en", 3),
        ]
    );
}

#[tokio::test]
async fn test_delete_refused_while_survey_active() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "", "N").await.unwrap();
    let service = QuestionGroupService::new(db.clone());
    let gid = service
        .try_insert_record(NewGroup::new(100, "en", "Keep me"))
        .await
        .unwrap();

    surveys::ActiveModel {
        sid: Set(100),
        active: Set("Y".to_string()),
        ..Default::default()
    }
    .update(&db)
    .await
    .unwrap();

    let session = AdminSession::new(1);
    let result = service
        .delete_with_dependency(gid, 100, &session)
        .await
        .unwrap();

    assert_eq!(result, None);
    let flashes = session.take_flashes();
    assert_eq!(flashes.len(), 1);
    assert_eq!(flashes[0].level, FlashLevel::Error);
    assert_eq!(
        flashes[0].message,
        "Can't delete question group when the survey is active"
    );
    assert_eq!(group_rows(&db, gid).await.len(), 1);
}

#[tokio::test]
async fn test_delete_cascades_to_questions_conditions_and_assessments() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "de", "N").await.unwrap();
    let service = QuestionGroupService::new(db.clone());

    let doomed = service
        .insert_new_group(translations(100, &[("en", "Doomed"), ("de", "Verloren")]))
        .await
        .unwrap()
        .unwrap();
    let kept = service
        .insert_new_group(translations(100, &[("en", "Kept"), ("de", "Behalten")]))
        .await
        .unwrap()
        .unwrap();

    for language in ["en", "de"] {
        create_question(&db, 10, language, 0, 100, doomed).await.unwrap();
        create_question(&db, 11, language, 10, 100, doomed).await.unwrap();
        create_question(&db, 20, language, 0, 100, kept).await.unwrap();
    }
    create_condition(&db, 10, 20).await.unwrap();
    create_condition(&db, 11, 10).await.unwrap();
    let survivor = create_condition(&db, 20, 20).await.unwrap();
    create_assessment(&db, 100, doomed).await.unwrap();
    let kept_assessment = create_assessment(&db, 100, kept).await.unwrap();

    let session = AdminSession::new(1);
    let deleted = service
        .delete_with_dependency(doomed, 100, &session)
        .await
        .unwrap();

    assert_eq!(deleted, Some(2));
    assert!(session.take_flashes().is_empty());
    assert!(group_rows(&db, doomed).await.is_empty());
    assert_eq!(group_rows(&db, kept).await.len(), 2);

    let remaining_questions: Vec<i32> = questions::Entity::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.qid)
        .collect();
    assert_eq!(remaining_questions, vec![20, 20]);

    let remaining_conditions = conditions::Entity::find().all(&db).await.unwrap();
    assert_eq!(remaining_conditions, vec![survivor]);

    let remaining_assessments = assessments::Entity::find().all(&db).await.unwrap();
    assert_eq!(remaining_assessments, vec![kept_assessment]);
}

#[tokio::test]
async fn test_group_description() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "de", "N").await.unwrap();
    let service = QuestionGroupService::new(db);

    let mut data = translations(100, &[("en", "About"), ("de", "Über")]);
    if let Some(en) = data.get_mut("en") {
        en.description = Some("Tell us about yourself".to_string());
    }
    let gid = service.insert_new_group(data).await.unwrap().unwrap();

    assert_eq!(
        service.get_group_description(gid, "en").await.unwrap(),
        "Tell us about yourself"
    );
    assert_eq!(service.get_group_description(gid, "de").await.unwrap(), "");

    let err = service
        .get_group_description(gid, "fr")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_first_group_returns_highest_gid() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "", "N").await.unwrap();
    create_survey(&db, 200, "", "N").await.unwrap();
    let service = QuestionGroupService::new(db);

    assert_eq!(service.get_first_group(100).await.unwrap(), None);

    service
        .insert_record(NewGroup::new(100, "en", "One").with_order(0))
        .await;
    service
        .insert_record(NewGroup::new(100, "en", "Two").with_order(1))
        .await;
    service
        .insert_record(NewGroup::new(200, "en", "Elsewhere"))
        .await;

    let first = service.get_first_group(100).await.unwrap().unwrap();
    assert_eq!(first.gid, 2);
    assert_eq!(first.group_name, "Two");
}

#[tokio::test]
async fn test_group_counts_by_question_presence() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "de", "N").await.unwrap();
    let service = QuestionGroupService::new(db.clone());

    let with_questions = service
        .insert_new_group(translations(100, &[("en", "Full"), ("de", "Voll")]))
        .await
        .unwrap()
        .unwrap();
    service
        .insert_new_group(translations(100, &[("en", "Empty"), ("de", "Leer")]))
        .await
        .unwrap();
    service
        .insert_new_group(translations(100, &[("en", "Also empty"), ("de", "Auch leer")]))
        .await
        .unwrap();

    for language in ["en", "de"] {
        create_question(&db, 1, language, 0, 100, with_questions)
            .await
            .unwrap();
        create_question(&db, 2, language, 0, 100, with_questions)
            .await
            .unwrap();
    }

    assert_eq!(service.total_groups_with_questions(100).await.unwrap(), 1);
    assert_eq!(service.total_groups_without_questions(100).await.unwrap(), 2);
    assert_eq!(service.total_groups_with_questions(999).await.unwrap(), 0);
}

#[tokio::test]
async fn test_relations_of_a_group() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "de", "N").await.unwrap();
    let service = QuestionGroupService::new(db.clone());

    let gid = service
        .insert_new_group(translations(100, &[("en", "Main"), ("de", "Haupt")]))
        .await
        .unwrap()
        .unwrap();
    create_question(&db, 3, "en", 0, 100, gid).await.unwrap();
    create_question(&db, 1, "en", 0, 100, gid).await.unwrap();
    create_question(&db, 2, "en", 1, 100, gid).await.unwrap();
    create_question(&db, 1, "de", 0, 100, gid).await.unwrap();

    let group = group_rows(&db, gid)
        .await
        .into_iter()
        .find(|row| row.language == "en")
        .unwrap();

    let survey = service.survey_of(&group).await.unwrap();
    assert_eq!(survey.sid, 100);

    let qids: Vec<i32> = service
        .questions_of(&group)
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.qid)
        .collect();
    assert_eq!(qids, vec![1, 3]);
}

#[tokio::test]
async fn test_search_filters_sorts_and_pages() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "", "N").await.unwrap();
    let service = QuestionGroupService::new(db).with_default_page_size(2);

    for (order, name) in ["Health", "Work", "Household", "Hobbies"].iter().enumerate() {
        service
            .try_insert_record(NewGroup::new(100, "en", *name).with_order(order as i32))
            .await
            .unwrap();
    }

    let session = AdminSession::new(1);
    let criteria = GroupSearch {
        sid: 100,
        language: "en".to_string(),
        group_name: Some("h".to_string()),
    };

    let page = service
        .search(&criteria, GroupSort::default(), 0, &session)
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.page_size, 2);
    assert_eq!(page.page_count(), 2);
    let names: Vec<_> = page.items.iter().map(|g| g.group_name.as_str()).collect();
    assert_eq!(names, vec!["Health", "Household"]);

    session.set_state(PAGE_SIZE_STATE, json!(10));
    let sort: GroupSort = "group_name.desc".parse().unwrap();
    let page = service.search(&criteria, sort, 0, &session).await.unwrap();
    let names: Vec<_> = page.items.iter().map(|g| g.group_name.as_str()).collect();
    assert_eq!(names, vec!["Household", "Hobbies", "Health"]);
    assert_eq!(page.page_count(), 1);

    let everything = GroupSearch {
        group_name: None,
        ..criteria
    };
    let page = service
        .search(&everything, GroupSort::default(), 0, &session)
        .await
        .unwrap();
    assert_eq!(page.total, 4);
}

#[tokio::test]
async fn test_get_all_records_without_condition() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "de", "N").await.unwrap();
    let service = QuestionGroupService::new(db);
    service
        .insert_new_group(translations(100, &[("en", "Main"), ("de", "Haupt")]))
        .await
        .unwrap();

    let rows = service
        .get_all_records(None, &[(question_groups::Column::Language, Order::Desc)])
        .await
        .unwrap();
    let languages: Vec<_> = rows.iter().map(|row| row.language.as_str()).collect();
    assert_eq!(languages, vec!["en", "de"]);
}

#[tokio::test]
async fn test_delete_leaves_other_surveys_groups_alone() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "", "N").await.unwrap();
    create_survey(&db, 200, "", "Y").await.unwrap();
    let service = QuestionGroupService::new(db.clone());

    question_groups::ActiveModel {
        gid: Set(7),
        language: Set("en".to_string()),
        sid: Set(200),
        group_name: Set("Running".to_string()),
        group_order: Set(0),
        description: Set(None),
        randomization_group: Set(String::new()),
        grelevance: Set(None),
    }
    .insert(&db)
    .await
    .unwrap();
    create_question(&db, 1, "en", 0, 200, 7).await.unwrap();
    create_question(&db, 2, "en", 1, 200, 7).await.unwrap();
    let condition = create_condition(&db, 1, 1).await.unwrap();
    let assessment = create_assessment(&db, 200, 7).await.unwrap();

    let session = AdminSession::new(1);
    let deleted = service
        .delete_with_dependency(7, 100, &session)
        .await
        .unwrap();

    assert_eq!(deleted, Some(0));
    assert!(session.take_flashes().is_empty());
    assert_eq!(group_rows(&db, 7).await.len(), 1);
    assert_eq!(questions::Entity::find().count(&db).await.unwrap(), 2);
    assert_eq!(
        conditions::Entity::find().all(&db).await.unwrap(),
        vec![condition]
    );
    assert_eq!(
        assessments::Entity::find().all(&db).await.unwrap(),
        vec![assessment]
    );
}

#[tokio::test]
async fn test_partially_translated_group_counts_as_having_questions() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "de", "N").await.unwrap();
    let service = QuestionGroupService::new(db.clone());

    let gid = service
        .insert_new_group(translations(100, &[("en", "Main"), ("de", "Haupt")]))
        .await
        .unwrap()
        .unwrap();
    create_question(&db, 1, "en", 0, 100, gid).await.unwrap();

    assert_eq!(service.total_groups_with_questions(100).await.unwrap(), 1);
    assert_eq!(service.total_groups_without_questions(100).await.unwrap(), 0);
}

#[tokio::test]
async fn test_search_matches_wildcards_literally() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "", "N").await.unwrap();
    let service = QuestionGroupService::new(db);

    for name in ["100% done", "Plain", "a_b"] {
        service
            .try_insert_record(NewGroup::new(100, "en", name))
            .await
            .unwrap();
    }

    let session = AdminSession::new(1);
    let search = |name: &str| GroupSearch {
        sid: 100,
        language: "en".to_string(),
        group_name: Some(name.to_string()),
    };

    let page = service
        .search(&search("_"), GroupSort::default(), 0, &session)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].group_name, "a_b");

    let page = service
        .search(&search("%"), GroupSort::default(), 0, &session)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].group_name, "100% done");

    let page = service
        .search(&search("plain"), GroupSort::default(), 0, &session)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_gid_allocation_stops_at_the_largest_id() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "", "N").await.unwrap();
    let service = QuestionGroupService::new(db);

    let mut last = NewGroup::new(100, "en", "Last");
    last.gid = Some(i32::MAX);
    assert_eq!(service.try_insert_record(last).await.unwrap(), i32::MAX);

    let err = service
        .try_insert_record(NewGroup::new(100, "en", "One more"))
        .await
        .unwrap_err();
    let errors = err.field_errors().expect("field errors");
    assert_eq!(errors.get("gid"), ["No group id left to allocate."]);
}

#[tokio::test]
async fn test_update_group_order_refuses_position_past_the_largest_order() {
    let db = setup_test_db().await.unwrap();
    create_survey(&db, 100, "", "N").await.unwrap();
    let service = QuestionGroupService::new(db.clone());

    let first = service
        .try_insert_record(NewGroup::new(100, "en", "A").with_order(3))
        .await
        .unwrap();
    let second = service
        .try_insert_record(NewGroup::new(100, "en", "B").with_order(4))
        .await
        .unwrap();

    let err = service
        .update_group_order(100, "en", i32::MAX)
        .await
        .unwrap_err();
    let errors = err.field_errors().expect("field errors");
    assert_eq!(
        errors.get("position"),
        ["Position leaves no room to number every group."]
    );

    assert_eq!(group_rows(&db, first).await[0].group_order, 3);
    assert_eq!(group_rows(&db, second).await[0].group_order, 4);

    question_groups::Entity::delete_many()
        .filter(question_groups::Column::Gid.eq(second))
        .exec(&db)
        .await
        .unwrap();
    assert_eq!(
        service.update_group_order(100, "en", i32::MAX).await.unwrap(),
        1
    );
    assert_eq!(group_rows(&db, first).await[0].group_order, i32::MAX);
}
