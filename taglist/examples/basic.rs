use taglist::{ItemArray, MaskRegistry, Match};

fn main() {
    let mut registry = MaskRegistry::new();
    let selected = registry.allocate();

    let mut items: ItemArray<&str> = ["apple", "banana", "cherry", "date"].into_iter().collect();
    items.set_state(1, selected, true).unwrap();
    items.set_state(3, selected, true).unwrap();

    let view = items.view(selected);
    println!("selected count: {}", view.count());
    for (index, item) in items.iter_tagged(selected, Match::All) {
        println!("  #{index}: {item}");
    }

    let mut cursor = items.cursor(selected, Match::All);
    let first = cursor.advance(&items).unwrap();
    println!("cursor first: {first:?}");
    items.remove_at(0).unwrap();
    println!("cursor after remove: {:?}", cursor.advance(&items));
}
