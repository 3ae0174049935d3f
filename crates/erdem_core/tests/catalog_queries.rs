use erdem_core::db::open_db_in_memory;
use erdem_core::{
    FileLookup, FileRepository, NameRule, NewFile, NewPerson, Participation,
    ParticipationRepository, PersonFilter, PersonRepository, SqliteFileRepository,
    SqliteParticipationRepository, SqlitePersonRepository, SqliteQueryService,
};
use rusqlite::Connection;

fn add_file(conn: &Connection, filename: &str) -> i64 {
    SqliteFileRepository::try_new(conn)
        .unwrap()
        .create_file(&NewFile::new(filename, format!("/media/{filename}")))
        .unwrap()
}

fn add_person(conn: &Connection, firstname: &str, lastname: Option<&str>) -> i64 {
    SqlitePersonRepository::try_new(conn)
        .unwrap()
        .create_person(&NewPerson::new(firstname, lastname))
        .unwrap()
}

fn link(conn: &Connection, file_id: i64, person_id: i64) {
    SqliteParticipationRepository::try_new(conn)
        .unwrap()
        .add_participation(&Participation {
            file_id,
            person_id,
            is_certain: true,
        })
        .unwrap();
}

fn deactivate(conn: &Connection, person_id: i64) {
    SqlitePersonRepository::try_new(conn)
        .unwrap()
        .set_deactivated(person_id, true)
        .unwrap();
}

#[test]
fn list_files_sorts_case_insensitively_and_keeps_ties_stable() {
    let conn = open_db_in_memory().unwrap();
    let zed = add_file(&conn, "zed.mp4");
    let upper = add_file(&conn, "Alpha.mp4");
    let lower = add_file(&conn, "alpha.mp4");
    let middle = add_file(&conn, "Middle.mkv");

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    let ids = service
        .list_files()
        .unwrap()
        .into_iter()
        .map(|file| file.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![upper, lower, middle, zed]);
}

#[test]
fn punctuation_in_names_sorts_after_letters() {
    let conn = open_db_in_memory().unwrap();
    let underscored = add_file(&conn, "song_b.mp3");
    let plain = add_file(&conn, "songa.mp3");
    let ann_marie = add_person(&conn, "Ann_Marie", None);
    let ann_b = add_person(&conn, "AnnB", None);

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    let file_ids = service
        .list_files()
        .unwrap()
        .into_iter()
        .map(|file| file.id)
        .collect::<Vec<_>>();
    assert_eq!(file_ids, vec![plain, underscored]);

    let person_ids = service
        .list_active_persons()
        .unwrap()
        .into_iter()
        .map(|person| person.id)
        .collect::<Vec<_>>();
    assert_eq!(person_ids, vec![ann_b, ann_marie]);

    let searched = service
        .search_files("song")
        .unwrap()
        .into_iter()
        .map(|file| file.id)
        .collect::<Vec<_>>();
    assert_eq!(searched, vec![plain, underscored]);
}

#[test]
fn list_active_persons_excludes_deactivated_and_sorts_by_display_name() {
    let conn = open_db_in_memory().unwrap();
    let zoe = add_person(&conn, "zoe", None);
    let ann_lee = add_person(&conn, "Ann", Some("Lee"));
    let ann = add_person(&conn, "ann", None);
    let bob = add_person(&conn, "Bob", None);
    deactivate(&conn, bob);

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    let persons = service.list_active_persons().unwrap();
    let ids = persons.iter().map(|person| person.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![ann, ann_lee, zoe]);
    assert!(persons.iter().all(|person| !person.is_deactivated));

    for pair in persons.windows(2) {
        assert!(
            pair[0].display_name().to_uppercase() <= pair[1].display_name().to_uppercase()
        );
    }
}

#[test]
fn list_persons_supports_every_activation_filter() {
    let conn = open_db_in_memory().unwrap();
    let active = add_person(&conn, "Ann", None);
    let inactive = add_person(&conn, "Bob", None);
    deactivate(&conn, inactive);

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    let ids = |filter| {
        service
            .list_persons(filter)
            .unwrap()
            .into_iter()
            .map(|person| person.id)
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(PersonFilter::Active), vec![active]);
    assert_eq!(ids(PersonFilter::Deactivated), vec![inactive]);
    assert_eq!(ids(PersonFilter::All), vec![active, inactive]);
}

#[test]
fn search_matches_substrings_literally() {
    let conn = open_db_in_memory().unwrap();
    let live = add_file(&conn, "Live at Home.mp4");
    let alive = add_file(&conn, "alive.avi");
    let percent = add_file(&conn, "100% live.mkv");
    add_file(&conn, "studio.flv");

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    let mut ids = service
        .search_files("live")
        .unwrap()
        .into_iter()
        .map(|file| file.id)
        .collect::<Vec<_>>();
    ids.sort_unstable();
    assert_eq!(ids, vec![live, alive, percent]);

    let percent_only = service.search_files("%").unwrap();
    assert_eq!(percent_only.len(), 1);
    assert_eq!(percent_only[0].id, percent);

    assert!(service.search_files("_").unwrap().is_empty());
}

#[test]
fn empty_search_returns_same_files_as_list() {
    let conn = open_db_in_memory().unwrap();
    add_file(&conn, "b.mp4");
    add_file(&conn, "A.mp4");
    add_file(&conn, "c.mp4");

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    assert_eq!(service.search_files("").unwrap(), service.list_files().unwrap());
}

#[test]
fn search_with_quote_characters_is_treated_as_data() {
    let conn = open_db_in_memory().unwrap();
    let quoted = add_file(&conn, "Rock 'n' Roll.mp4");
    add_file(&conn, "plain.mp4");

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    let hits = service.search_files("'n'").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, quoted);

    let injection = service.search_files("' OR '1'='1").unwrap();
    assert!(injection.is_empty());

    let files: i64 = conn
        .query_row("SELECT COUNT(*) FROM files;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(files, 2);
}

#[test]
fn resolve_file_participants_filters_deactivated_persons() {
    let conn = open_db_in_memory().unwrap();
    let song = add_file(&conn, "Song.mp3");
    let ann = add_person(&conn, "Ann", Some("Lee"));
    let bob = add_person(&conn, "Bob", None);
    link(&conn, song, ann);
    link(&conn, song, bob);
    deactivate(&conn, bob);

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    let resolved = service
        .resolve_file_participants(song)
        .unwrap()
        .found()
        .unwrap();
    assert_eq!(resolved.filename, "Song.mp3");
    assert_eq!(resolved.fullpath, "/media/Song.mp3");
    assert_eq!(resolved.review, None);
    assert_eq!(resolved.participants.len(), 1);
    assert_eq!(resolved.participants[0].id, ann);
    assert_eq!(resolved.participants[0].firstname, "Ann");
    assert_eq!(resolved.participants[0].lastname.as_deref(), Some("Lee"));
}

#[test]
fn resolve_file_participants_without_links_returns_empty_list() {
    let conn = open_db_in_memory().unwrap();
    add_file(&conn, "Song.mp3");
    let lonely = add_file(&conn, "Lonely.mp4");

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    match service.resolve_file_participants(lonely).unwrap() {
        FileLookup::Found(file) => {
            assert_eq!(file.filename, "Lonely.mp4");
            assert!(file.participants.is_empty());
        }
        FileLookup::NotFound => panic!("existing file reported as missing"),
    }
}

#[test]
fn resolve_file_participants_with_only_deactivated_persons_still_finds_file() {
    let conn = open_db_in_memory().unwrap();
    let file = add_file(&conn, "Archive.avi");
    let bob = add_person(&conn, "Bob", None);
    link(&conn, file, bob);
    deactivate(&conn, bob);

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    let resolved = service
        .resolve_file_participants(file)
        .unwrap()
        .found()
        .expect("file with only deactivated participants must resolve");
    assert!(resolved.participants.is_empty());
}

#[test]
fn resolve_file_participants_reports_missing_file() {
    let conn = open_db_in_memory().unwrap();
    add_file(&conn, "Song.mp3");

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    assert_eq!(
        service.resolve_file_participants(999).unwrap(),
        FileLookup::NotFound
    );
}

#[test]
fn resolve_file_participants_keeps_link_order() {
    let conn = open_db_in_memory().unwrap();
    let file = add_file(&conn, "Band.mkv");
    let zoe = add_person(&conn, "Zoe", None);
    let amy = add_person(&conn, "Amy", None);
    link(&conn, file, zoe);
    link(&conn, file, amy);

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    let resolved = service
        .resolve_file_participants(file)
        .unwrap()
        .found()
        .unwrap();
    let ids = resolved
        .participants
        .iter()
        .map(|participant| participant.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![zoe, amy]);
}

#[test]
fn resolve_person_files_keeps_history_of_deactivated_person() {
    let conn = open_db_in_memory().unwrap();
    let first = add_file(&conn, "first.mp4");
    let second = add_file(&conn, "second.mp4");
    add_file(&conn, "unrelated.mp4");
    let bob = add_person(&conn, "Bob", None);
    link(&conn, first, bob);
    link(&conn, second, bob);
    deactivate(&conn, bob);

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    assert!(service
        .list_active_persons()
        .unwrap()
        .iter()
        .all(|person| person.id != bob));

    let history = service.resolve_person_files(bob).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, first);
    assert_eq!(history[0].filename, "first.mp4");
    assert_eq!(history[1].id, second);
    assert!(history.iter().all(|entry| entry.person_id == bob
        && entry.firstname == "Bob"
        && entry.lastname.is_none()));
}

#[test]
fn resolve_person_files_for_unknown_person_is_empty() {
    let conn = open_db_in_memory().unwrap();
    add_file(&conn, "first.mp4");

    let service = SqliteQueryService::sqlite(&conn).unwrap();
    assert!(service.resolve_person_files(77).unwrap().is_empty());
}

#[test]
fn find_by_name_distinguishes_missing_lastname() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let bare = repo.create_person(&NewPerson::new("Ann", None)).unwrap();
    let mut full = NewPerson::new("Ann", Some("Lee"));
    full.extraction_rule = NameRule::AlmostCertain;
    let full_id = repo.create_person(&full).unwrap();

    assert_eq!(repo.find_by_name("Ann", None).unwrap().unwrap().id, bare);
    let found = repo.find_by_name("Ann", Some("Lee")).unwrap().unwrap();
    assert_eq!(found.id, full_id);
    assert_eq!(found.extraction_rule, NameRule::AlmostCertain);
    assert!(repo.find_by_name("Ann", Some("Other")).unwrap().is_none());
}

#[test]
fn relinking_updates_certainty_without_duplicating() {
    let conn = open_db_in_memory().unwrap();
    let file = add_file(&conn, "dup.mp4");
    let ann = add_person(&conn, "Ann", None);
    let repo = SqliteParticipationRepository::try_new(&conn).unwrap();
    repo.add_participation(&Participation {
        file_id: file,
        person_id: ann,
        is_certain: true,
    })
    .unwrap();
    repo.add_participation(&Participation {
        file_id: file,
        person_id: ann,
        is_certain: false,
    })
    .unwrap();

    let links = repo.list_participation().unwrap();
    assert_eq!(links.len(), 1);
    assert!(!links[0].is_certain);
}
