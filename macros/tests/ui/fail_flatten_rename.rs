use macros::QueryParams;

#[derive(QueryParams)]
struct Filter {
    #[query(flatten, rename = "page")]
    paging: String,
}

fn main() {}
