use avl_search::SearchTree;

fn main() {
    let mut tree = SearchTree::new();
    for key in [8, 5, 7, 1, 9, 6] {
        tree.insert(key);
    }

    println!("{tree:?}");
    println!("in order:   {:?}", tree.in_order().collect::<Vec<_>>());
    println!("pre order:  {:?}", tree.pre_order().collect::<Vec<_>>());
    println!("post order: {:?}", tree.post_order().collect::<Vec<_>>());

    if let (Ok(min), Ok(max)) = (tree.minimum(), tree.maximum()) {
        println!("minimum = {min}, maximum = {max}");
    }

    // Shift key 5 upwards by a hundred, relocating it in the order.
    tree.delete_or_update_or_insert(5, |_| false, |key| key + 100, false);
    println!("after relocation: {:?}", tree.in_order().collect::<Vec<_>>());

    while let Ok(min) = tree.delete_minimum() {
        print!("{min} ");
    }
    println!();
}
