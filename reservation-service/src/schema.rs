diesel::table! {
    reservations (id) {
        id -> Int8,
        name -> Varchar,
    }
}
