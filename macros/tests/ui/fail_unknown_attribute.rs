use macros::QueryParams;

#[derive(QueryParams)]
struct Filter {
    #[query(alias = "e")]
    email: String,
}

fn main() {}
