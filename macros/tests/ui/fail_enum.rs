use macros::QueryParams;

#[derive(QueryParams)]
enum Kind {
    Admin,
}

fn main() {}
