diesel::table! {
    books (id) {
        id -> Int4,
        title -> Text,
        author -> Text,
        price -> Int8,
    }
}

diesel::table! {
    orders (id) {
        id -> Int4,
        customer_id -> Int4,
        updated_at -> Timestamptz,
        order_state -> Int4,
        total -> Int8,
    }
}

diesel::table! {
    order_details (id) {
        id -> Int4,
        order_id -> Int4,
        book_id -> Int4,
        quantity -> Int4,
        subtotal -> Int8,
    }
}

diesel::joinable!(order_details -> orders (order_id));
diesel::joinable!(order_details -> books (book_id));

diesel::allow_tables_to_appear_in_same_query!(books, orders, order_details,);
