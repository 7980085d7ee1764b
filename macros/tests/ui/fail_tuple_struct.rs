use macros::QueryParams;

#[derive(QueryParams)]
struct Pair(i32, i32);

fn main() {}
