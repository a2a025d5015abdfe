use taglist::ItemArray;

fn main() {
    let mut items = ItemArray::new();
    let ids: Vec<_> = ["delta", "alpha", "charlie", "bravo"]
        .into_iter()
        .map(|name| items.add(name))
        .collect();

    items.sort_by(|a, b| a.cmp(b));
    for id in &ids {
        println!(
            "{:?} -> index {:?} ({:?})",
            id,
            items.index_of_entry(*id),
            items.resolve(*id)
        );
    }

    let removed = items.remove_entry(ids[0]);
    println!(
        "removed {removed:?}; stale handle resolves to {:?}",
        items.resolve(ids[0])
    );
}
