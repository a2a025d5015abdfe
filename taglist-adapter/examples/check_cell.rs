use taglist_adapter::check::{CheckCell, CheckState};

fn main() {
    let mut cell = CheckCell::new("Y", "N", Some("?"), true);
    cell.set_value(Some("N"));
    for _ in 0..4 {
        let state = cell.toggle();
        println!("{state:?} -> stored {:?}", cell.value());
    }
    assert_eq!(cell.state(), CheckState::Checked);
}
