use section_sync::{
    BatchStats,
    ControllerConfig,
    ObjectChange,
    ObjectEvent,
    ResultsController,
    ResultsControllerDelegate,
    SectionChange,
    SectionedResultsController,
    SortDescriptors,
};
use std::{
    hash::{Hash, Hasher},
    thread,
};

#[derive(Debug, Clone)]
struct Task {
    id: u32,
    title: String,
    status: &'static str,
    priority: u8,
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

fn task(id: u32, title: &str, status: &'static str, priority: u8) -> Task {
    Task { id, title: title.to_string(), status, priority }
}

struct PrintingDelegate;

impl ResultsControllerDelegate<&'static str, Task> for PrintingDelegate {
    fn will_change_content(&mut self) {
        println!("-- begin updates");
    }

    fn did_change_section(&mut self, section: &&'static str, change: SectionChange) {
        println!("   section '{section}': {change:?}");
    }

    fn did_change_object(&mut self, object: &Task, change: ObjectChange) {
        println!("   task #{} '{}': {change:?}", object.id, object.title);
    }

    fn did_change_content(&mut self, stats: &BatchStats) {
        println!("-- end updates ({stats})");
    }
}

fn dump(controller: &SectionedResultsController<&'static str, Task>) {
    for (index, section) in controller.sections().enumerate() {
        let titles: Vec<&str> = section.objects().iter().map(|t| t.title.as_str()).collect();
        println!("   [{index}] {:?}: {titles:?}", section.represented_object());
    }
}

fn main() {
    env_logger::init();

    let mut controller = SectionedResultsController::builder(|t: &Task| t.status)
        .with_sort(
            SortDescriptors::new()
                .with_key(|t: &Task| t.priority, false)
                .with_key(|t: &Task| t.title.clone(), true),
        )
        .with_config(ControllerConfig::default())
        .with_delegate(Box::new(PrintingDelegate))
        .build();

    let fetched = controller
        .perform_fetch(vec![
            task(1, "write parser", "doing", 3),
            task(2, "review diff", "todo", 2),
            task(3, "fix scroll bug", "todo", 5),
            task(4, "release notes", "done", 1),
        ])
        .unwrap_or(0);
    println!("== fetched {fetched} tasks");
    dump(&controller);

    println!("== batch: status changes and a new task");
    let stats = controller.process(vec![
        ObjectEvent::Updated { object: task(2, "review diff", "doing", 2), content_changed: true },
        ObjectEvent::Inserted(task(5, "triage issues", "todo", 4)),
        ObjectEvent::Removed(task(4, "", "", 0)),
    ]);
    println!("== result: {stats:?}");
    dump(&controller);

    println!("== batch: events from a background producer");
    let sender = controller.event_sender();
    let producer = thread::spawn(move || {
        sender.updated(task(3, "fix scroll bug", "done", 5), false);
        sender.updated(task(1, "write parser (v2)", "doing", 1), true);
    });
    if producer.join().is_err() {
        eprintln!("producer thread panicked");
        return;
    }
    let stats = controller.flush();
    println!("== result: {stats:?}");
    dump(&controller);

    let snapshot = controller.snapshot_reader().load();
    println!("== snapshot generation {} holds {} tasks", snapshot.generation(), snapshot.len());
}
