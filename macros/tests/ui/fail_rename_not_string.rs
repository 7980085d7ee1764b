use macros::QueryParams;

#[derive(QueryParams)]
struct Filter {
    #[query(rename = 5)]
    email: String,
}

fn main() {}
