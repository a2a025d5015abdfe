use taglist_adapter::{ListHost, ListModel, ListOptions, SelectionMode};

/// Pretends to be a native list control: it prints what the model reports and lets "users" click.
#[derive(Default)]
struct ConsoleHost {
    rows: Vec<String>,
    selected: Vec<usize>,
}

impl ListHost for ConsoleHost {
    fn pull_selection(&mut self) -> Vec<usize> {
        println!("  host: pull_selection -> {:?}", self.selected);
        self.selected.clone()
    }

    fn push_selection(&mut self, index: usize, selected: bool) {
        println!("  host: push_selection({index}, {selected})");
        self.selected.retain(|&i| i != index);
        if selected {
            self.selected.push(index);
        }
    }

    fn insert_item(&mut self, index: usize, text: &str) {
        self.rows.insert(index, text.to_string());
        self.selected
            .iter_mut()
            .filter(|i| **i >= index)
            .for_each(|i| *i += 1);
    }

    fn remove_item(&mut self, index: usize) {
        self.rows.remove(index);
        self.selected.retain(|&i| i != index);
        self.selected
            .iter_mut()
            .filter(|i| **i > index)
            .for_each(|i| *i -= 1);
    }

    fn clear_items(&mut self) {
        self.rows.clear();
        self.selected.clear();
    }
}

fn main() {
    let options = ListOptions::new()
        .selection_mode(SelectionMode::MultiExtended)
        .sorted(true)
        .on_selection_changed(|change| println!("  selection changed: {change:?}"));
    let mut list = ListModel::with_host(options, ConsoleHost::default());

    list.add_range(["pear", "apple", "fig", "banana"]).unwrap();
    println!("rows: {:?}", list.host().rows);

    println!("select banana + pear");
    list.batch_update(|l| {
        l.set_selected(1, true).unwrap();
        l.set_selected(3, true).unwrap();
    });

    println!("user clicks fig on the native control");
    list.host_mut().selected.push(2);
    list.mark_selection_dirty();
    println!("selected: {:?}", list.selected_items());

    println!("find 'B': {:?}", list.find_string("B", None).unwrap());
    println!("snapshot: {:?}", list.state());
}
