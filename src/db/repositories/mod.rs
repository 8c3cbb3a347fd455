mod stickers;
