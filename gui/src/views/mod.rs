mod compact;
mod earnings;
mod gate;
mod landing;
mod layout;
mod overview;
mod stake;
mod transactions;
mod vip;
mod withdraw;
