#[cfg(test)]
mod tests {
    use section_sync::{
        OrderedSet,
        ProtocolViolation,
        SectionInfo,
        SortDescriptors,
    };
    use std::hash::{Hash, Hasher};

    #[derive(Debug, Clone)]
    struct Contact {
        id: u32,
        name: String,
    }

    impl PartialEq for Contact {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }

    impl Eq for Contact {}

    impl Hash for Contact {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    fn contact(id: u32, name: &str) -> Contact {
        Contact { id, name: name.to_string() }
    }

    fn by_name() -> SortDescriptors<Contact> {
        SortDescriptors::new().with_key(|c: &Contact| c.name.clone(), true)
    }

    fn letter_section(names: &[(u32, &str)]) -> SectionInfo<char, Contact> {
        let objects: OrderedSet<Contact> = names.iter().map(|(id, name)| contact(*id, name)).collect();
        let mut section = SectionInfo::with_objects(Some('A'), objects);
        section.begin_editing().unwrap();
        section.sort(&by_name());
        section.end_editing(&[]).unwrap();
        section
    }

    fn names(section: &SectionInfo<char, Contact>) -> Vec<&str> {
        section.objects().iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_transaction_discipline() {
        println!("== Section transaction discipline ==");
        let mut section = letter_section(&[(1, "Ada"), (2, "Alan")]);

        assert_eq!(section.end_editing(&[]).unwrap_err(), ProtocolViolation::NotEditing);

        section.begin_editing().unwrap();
        assert_eq!(section.begin_editing(), Err(ProtocolViolation::AlreadyEditing));

        section.mark_needs_sort();
        assert_eq!(section.end_editing(&[]).unwrap_err(), ProtocolViolation::SortPending);
        assert!(section.is_editing());

        section.sort(&by_name());
        assert!(section.end_editing(&[]).unwrap().is_empty());
        assert!(!section.is_editing());
        println!("== Section transaction discipline == success");
    }

    #[test]
    fn test_rename_reorders_and_updates() {
        let mut section = letter_section(&[(1, "Ada"), (2, "Alan"), (3, "Anna")]);
        assert_eq!(names(&section), vec!["Ada", "Alan", "Anna"]);

        section.begin_editing().unwrap();
        // Ada is renamed and now sorts last
        assert!(section.mark_updated(contact(1, "Azure")).unwrap());
        section.mark_needs_sort();
        section.sort(&by_name());
        let cs = section.end_editing(&[]).unwrap();

        assert_eq!(names(&section), vec!["Alan", "Anna", "Azure"]);
        let moves: Vec<_> = cs.moved().iter().map(|m| (m.element.id, m.from, m.to)).collect();
        assert_eq!(moves, vec![(1, 0, 2), (2, 1, 0), (3, 2, 1)]);
        assert_eq!(cs.updated().len(), 1);
        assert_eq!(cs.updated()[0].element.name, "Azure");
        assert_eq!((cs.updated()[0].from, cs.updated()[0].to), (0, 2));
    }

    #[test]
    fn test_force_updates_pass_through() {
        let mut section = letter_section(&[(1, "Ada"), (2, "Alan")]);
        section.begin_editing().unwrap();
        let cs = section.end_editing(&[contact(2, ""), contact(9, "Nobody")]).unwrap();

        assert_eq!(cs.updated().len(), 1);
        assert_eq!(cs.updated()[0].element.id, 2);
        assert!(cs.updated()[0].is_in_place());
        assert!(cs.moved().is_empty());
    }

    #[test]
    fn test_many_mutations_one_diff() {
        let mut section = letter_section(&[(1, "Ada"), (2, "Alan"), (3, "Anna"), (4, "Arthur")]);
        let before = section.objects().clone();

        section.begin_editing().unwrap();
        section.remove(&contact(2, "")).unwrap();
        section.add(contact(5, "Abel")).unwrap();
        section.add(contact(6, "Amy")).unwrap();
        section.remove(&contact(6, "")).unwrap();
        section.remove(&contact(4, "")).unwrap();
        section.add(contact(4, "Arthur")).unwrap();
        section.sort(&by_name());
        let cs = section.end_editing(&[]).unwrap();

        assert_eq!(names(&section), vec!["Abel", "Ada", "Anna", "Arthur"]);
        let deleted: Vec<u32> = cs.deleted().iter().map(|d| d.element.id).collect();
        let inserted: Vec<u32> = cs.inserted().iter().map(|i| i.element.id).collect();
        assert_eq!(deleted, vec![2]);
        assert_eq!(inserted, vec![5]);
        assert_eq!(cs.apply(before.as_slice()).as_deref(), Some(section.objects().as_slice()));
    }

    #[test]
    fn test_abort_keeps_previous_state() {
        let mut section = letter_section(&[(1, "Ada"), (2, "Alan")]);
        section.begin_editing().unwrap();
        section.remove(&contact(1, "")).unwrap();
        section.add(contact(3, "Aaron")).unwrap();
        section.abort_editing().unwrap();

        assert_eq!(names(&section), vec!["Ada", "Alan"]);
        section.begin_editing().unwrap();
        assert!(section.end_editing(&[]).unwrap().is_empty());
    }
}
