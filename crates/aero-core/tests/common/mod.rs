use aero_core::repo::memory::authority_repository;
use aero_core::{Authority, InMemoryRepository};

/// Fresh, empty Authority repository
#[allow(dead_code)]
pub fn new_repo() -> InMemoryRepository<Authority> {
    authority_repository()
}

/// Repository pre-loaded with `count` authorities `R00..` named `Role NN`
#[allow(dead_code)]
pub fn seeded_repo(count: usize) -> InMemoryRepository<Authority> {
    use aero_core::Repository;

    let repo = new_repo();
    for i in 0..count {
        repo.save(Authority::new(format!("R{:02}", i), format!("Role {:02}", i)))
            .unwrap();
    }
    repo
}

#[allow(dead_code)]
pub fn key(id: &str) -> String {
    id.to_string()
}
