//! Integration tests for the poem repository
//!
//! Uses a temporary root folder populated with numbered poem files and a
//! seeded RNG so draws are reproducible.

use pt_common::{Category, Error, PoemRepository};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

fn write_poems(root: &Path, category: Category, count: u32) {
    let dir = root.join(category.dir_name());
    std::fs::create_dir_all(&dir).unwrap();
    for id in 1..=count {
        std::fs::write(dir.join(format!("{}.txt", id)), format!("{} poem {}\nline two", category, id))
            .unwrap();
    }
}

#[test]
fn test_pick_stays_in_range() {
    let root = tempfile::tempdir().unwrap();
    write_poems(root.path(), Category::Human, 5);
    let repo = PoemRepository::with_counts(root.path(), 5, 5);
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let poem = repo.pick(Category::Human, 5, &mut rng).unwrap();
        assert!((1..=5).contains(&poem.id));
        assert_eq!(poem.category, Category::Human);
        assert_eq!(poem.path, format!("./real_poems/{}.txt", poem.id));
        assert_eq!(poem.text, format!("Human poem {}\nline two", poem.id));
    }
}

#[test]
fn test_pick_single_poem() {
    let root = tempfile::tempdir().unwrap();
    write_poems(root.path(), Category::Ai, 1);
    let repo = PoemRepository::with_counts(root.path(), 1, 1);
    let mut rng = StdRng::seed_from_u64(1);

    let poem = repo.pick(Category::Ai, 1, &mut rng).unwrap();
    assert_eq!(poem.id, 1);
    assert_eq!(poem.path, "./fake_poems/1.txt");
}

#[test]
fn test_pick_zero_count_rejected() {
    let root = tempfile::tempdir().unwrap();
    let repo = PoemRepository::new(root.path());
    let mut rng = StdRng::seed_from_u64(1);

    let result = repo.pick(Category::Ai, 0, &mut rng);
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_missing_poem_is_not_found() {
    let root = tempfile::tempdir().unwrap();
    let repo = PoemRepository::new(root.path());

    let result = repo.load(Category::Human, 42);
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_reading_twice_is_identical() {
    let root = tempfile::tempdir().unwrap();
    write_poems(root.path(), Category::Human, 3);
    let repo = PoemRepository::with_counts(root.path(), 3, 3);

    let first = repo.load(Category::Human, 2).unwrap();
    let second = repo.load(Category::Human, 2).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_draw_uses_both_categories() {
    let root = tempfile::tempdir().unwrap();
    write_poems(root.path(), Category::Human, 4);
    write_poems(root.path(), Category::Ai, 2);
    let repo = PoemRepository::with_counts(root.path(), 4, 2);
    let mut rng = StdRng::seed_from_u64(2024);

    let mut human = 0;
    let mut ai = 0;
    for _ in 0..200 {
        let poem = repo.draw(&mut rng).unwrap();
        match poem.category {
            Category::Human => {
                human += 1;
                assert!((1..=4).contains(&poem.id));
            }
            Category::Ai => {
                ai += 1;
                assert!((1..=2).contains(&poem.id));
            }
        }
    }
    assert!(human > 0 && ai > 0);
}
